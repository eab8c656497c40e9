//! Catalog types: canonical parts and colours, the aliases that point at
//! them, and the inventory rows that reference them.
//!
//! Inventory rows only ever reference canonical identifiers. Foreign
//! identifiers (BrickLink / Instabrick item ids) live in the alias tables.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Name given to a part whose real name is not yet known.
pub const PLACEHOLDER_NAME: &str = "Unknown part";

/// Returns `true` if `name` carries no real information.
pub fn is_placeholder_name(name: &str) -> bool {
  let name = name.trim();
  name.is_empty() || name == PLACEHOLDER_NAME
}

// ─── Parts ───────────────────────────────────────────────────────────────────

/// A part as known to the canonical catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalPart {
  pub design_id: String,
  pub name:      String,
  pub url:       Option<String>,
  pub image_url: Option<String>,
}

impl CanonicalPart {
  /// A part with no url or image, e.g. one typed in by hand.
  pub fn new(design_id: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      design_id: design_id.into(),
      name:      name.into(),
      url:       None,
      image_url: None,
    }
  }

  pub fn has_placeholder_name(&self) -> bool { is_placeholder_name(&self.name) }
}

/// Maps a foreign part identifier onto a canonical `design_id`.
///
/// An alias with `alias_id == design_id` is a *placeholder*: the foreign id
/// was registered as if it were canonical because nothing better was known
/// at ingest time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartAlias {
  pub alias_id:  String,
  pub design_id: String,
}

impl PartAlias {
  pub fn is_placeholder(&self) -> bool { self.alias_id == self.design_id }
}

// ─── Colours ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
  pub id:   i64,
  pub name: String,
  /// Six upper-case hex digits, no leading `#`.
  pub hex:  String,
}

impl Color {
  /// Build a colour, normalising `hex` (`"#05131d"` → `"05131D"`).
  pub fn new(id: i64, name: impl Into<String>, hex: &str) -> Result<Self> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
      return Err(Error::InvalidHex(hex.to_owned()));
    }
    Ok(Self { id, name: name.into(), hex: digits.to_ascii_uppercase() })
  }

  /// The `(r, g, b)` components of [`Color::hex`].
  pub fn rgb(&self) -> (u8, u8, u8) {
    let channel = |i: usize| {
      self
        .hex
        .get(i..i + 2)
        .and_then(|s| u8::from_str_radix(s, 16).ok())
        .unwrap_or(0)
    };
    (channel(0), channel(2), channel(4))
  }
}

/// Maps a BrickLink colour id onto a canonical colour id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorAlias {
  pub alias_id: i64,
  pub color_id: i64,
}

// ─── Inventory ───────────────────────────────────────────────────────────────

/// Where a counted quantity of a part currently is.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryStatus {
  /// Sorted into drawers / containers.
  #[default]
  Loose,
  Built,
  InBox,
  Teardown,
  Wip,
  Other(String),
}

impl InventoryStatus {
  /// The value stored in the `status` column.
  pub fn as_str(&self) -> &str {
    match self {
      Self::Loose => "loose",
      Self::Built => "built",
      Self::InBox => "in_box",
      Self::Teardown => "teardown",
      Self::Wip => "wip",
      Self::Other(s) => s.as_str(),
    }
  }

  /// Parse a stored value or a human label such as `"Work in Progress"`.
  pub fn from_label(label: &str) -> Self {
    match label.trim() {
      "loose" | "Loose" => Self::Loose,
      "built" | "Built" => Self::Built,
      "in_box" | "In Box" => Self::InBox,
      "teardown" | "Teardown" => Self::Teardown,
      "wip" | "WIP" | "Work in Progress" => Self::Wip,
      other => Self::Other(other.to_lowercase().replace(' ', "_")),
    }
  }
}

/// A quantity of one `(design_id, color_id)` combination at one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRow {
  pub id:         i64,
  pub design_id:  String,
  pub color_id:   i64,
  pub quantity:   i64,
  pub status:     InventoryStatus,
  pub drawer:     Option<String>,
  pub container:  Option<String>,
  pub set_number: Option<String>,
}

/// Input to [`crate::store::CatalogStore::insert_inventory`]; the row id is
/// assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInventoryRow {
  pub design_id:  String,
  pub color_id:   i64,
  pub quantity:   i64,
  pub status:     InventoryStatus,
  pub drawer:     Option<String>,
  pub container:  Option<String>,
  pub set_number: Option<String>,
}

impl NewInventoryRow {
  /// A loose row with no location.
  pub fn loose(design_id: impl Into<String>, color_id: i64, quantity: i64) -> Self {
    Self {
      design_id: design_id.into(),
      color_id,
      quantity,
      status: InventoryStatus::Loose,
      drawer: None,
      container: None,
      set_number: None,
    }
  }
}

// ─── Migration ───────────────────────────────────────────────────────────────

/// A resolved alias, ready to be applied by the migration committer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
  pub alias_id: String,
  /// The canonical part the alias resolves to. Its name may be a
  /// placeholder if the resolving source did not supply one.
  pub part:     CanonicalPart,
  /// Label of whatever produced the resolution, kept in the migration log.
  pub source:   String,
}

impl Migration {
  pub fn is_identity(&self) -> bool { self.alias_id == self.part.design_id }
}

/// What the committer did with one [`Migration`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MigrationOutcome {
  /// Alias recorded, inventory rewritten, placeholder removed.
  Migrated { rows_moved: usize },
  /// The alias turned out to be a canonical id itself; its self-alias was
  /// retired and the part row kept.
  ConfirmedCanonical,
  /// The alias already maps to a different canonical part; left untouched.
  Skipped { existing: String },
  /// A persistence error rolled this alias back.
  Failed { error: String },
}

impl MigrationOutcome {
  pub fn is_applied(&self) -> bool {
    matches!(self, Self::Migrated { .. } | Self::ConfirmedCanonical)
  }
}

/// One row of the append-only migration log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationRecord {
  pub run_id:      String,
  pub alias_id:    String,
  pub design_id:   String,
  pub source:      String,
  pub rows_moved:  i64,
  /// RFC 3339 timestamp assigned by the store.
  pub migrated_at: String,
}

/// Late-arriving details for a canonical part, used to upgrade placeholder
/// names and backfill links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartDetails {
  pub design_id: String,
  pub name:      Option<String>,
  pub url:       Option<String>,
  pub image_url: Option<String>,
}

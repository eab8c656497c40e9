//! Conversions between domain types and the column values stored in SQLite.
//!
//! Timestamps are RFC 3339 strings. Inventory status is stored as its
//! snake_case label.

use brickyard_core::catalog::{
  CanonicalPart, InventoryRow, InventoryStatus, MigrationRecord,
};
use chrono::{DateTime, Utc};

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn encode_status(status: &InventoryStatus) -> String {
  status.as_str().to_owned()
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

pub const PART_COLUMNS: &str = "design_id, name, url, image_url";

pub struct RawPart {
  pub design_id: String,
  pub name:      String,
  pub url:       Option<String>,
  pub image_url: Option<String>,
}

impl RawPart {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      design_id: row.get(0)?,
      name:      row.get(1)?,
      url:       row.get(2)?,
      image_url: row.get(3)?,
    })
  }

  pub fn into_part(self) -> CanonicalPart {
    CanonicalPart {
      design_id: self.design_id,
      name:      self.name,
      url:       self.url,
      image_url: self.image_url,
    }
  }
}

pub const INVENTORY_COLUMNS: &str =
  "i.id, i.design_id, i.color_id, i.quantity, i.status, i.drawer, i.container, i.set_number";

pub struct RawInventoryRow {
  pub id:         i64,
  pub design_id:  String,
  pub color_id:   i64,
  pub quantity:   i64,
  pub status:     String,
  pub drawer:     Option<String>,
  pub container:  Option<String>,
  pub set_number: Option<String>,
}

impl RawInventoryRow {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      design_id:  row.get(1)?,
      color_id:   row.get(2)?,
      quantity:   row.get(3)?,
      status:     row.get(4)?,
      drawer:     row.get(5)?,
      container:  row.get(6)?,
      set_number: row.get(7)?,
    })
  }

  pub fn into_row(self) -> InventoryRow {
    InventoryRow {
      id:         self.id,
      design_id:  self.design_id,
      color_id:   self.color_id,
      quantity:   self.quantity,
      status:     InventoryStatus::from_label(&self.status),
      drawer:     self.drawer,
      container:  self.container,
      set_number: self.set_number,
    }
  }
}

pub struct RawMigrationRecord {
  pub run_id:      String,
  pub alias_id:    String,
  pub design_id:   String,
  pub source:      String,
  pub rows_moved:  i64,
  pub migrated_at: String,
}

impl RawMigrationRecord {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      run_id:      row.get(0)?,
      alias_id:    row.get(1)?,
      design_id:   row.get(2)?,
      source:      row.get(3)?,
      rows_moved:  row.get(4)?,
      migrated_at: row.get(5)?,
    })
  }

  pub fn into_record(self) -> MigrationRecord {
    MigrationRecord {
      run_id:      self.run_id,
      alias_id:    self.alias_id,
      design_id:   self.design_id,
      source:      self.source,
      rows_moved:  self.rows_moved,
      migrated_at: self.migrated_at,
    }
  }
}

//! Instabrick XML export codec for brickyard.
//!
//! Decodes the `<INVENTORY><ITEM>…</ITEM></INVENTORY>` export into
//! [`ExportItem`]s. Pure synchronous; no HTTP or database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! let xml = std::fs::read_to_string("instabrick_inventory.xml").unwrap();
//! for item in brickyard_instabrick::parse(&xml).unwrap() {
//!   println!("{} x{} in colour {}", item.item_id, item.quantity, item.color);
//! }
//! ```

pub mod error;
mod parse;
mod remarks;

use brickyard_core::catalog::InventoryStatus;

pub use error::{Error, Result};
pub use parse::parse;
pub use remarks::parse_remarks;

// ─── Public types ────────────────────────────────────────────────────────────

/// One `<ITEM>` of the export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportItem {
  /// BrickLink-style item id; an alias, not a canonical id.
  pub item_id:   String,
  pub item_name: String,
  /// BrickLink colour id.
  pub color:     i64,
  pub quantity:  i64,
  pub placement: Placement,
}

/// Where the pieces are, decoded from `<REMARKS>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Placement {
  pub status:     InventoryStatus,
  pub drawer:     Option<String>,
  pub container:  Option<String>,
  pub set_number: Option<String>,
}

//! The `CatalogStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `brickyard-store-sqlite`). The reconciliation pipeline depends on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use crate::catalog::{
  CanonicalPart, Color, ColorAlias, InventoryRow, Migration, MigrationOutcome,
  MigrationRecord, NewInventoryRow, PartAlias, PartDetails,
};

/// Abstraction over a brickyard catalog backend.
///
/// All methods return `Send` futures so the trait can be used from a
/// multi-threaded tokio runtime.
pub trait CatalogStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Parts ─────────────────────────────────────────────────────────────

  /// Retrieve a canonical part. Returns `None` if not found.
  fn get_part<'a>(
    &'a self,
    design_id: &'a str,
  ) -> impl Future<Output = Result<Option<CanonicalPart>, Self::Error>> + Send + 'a;

  /// Insert a part, or upgrade the stored name if it is still a placeholder.
  /// A non-placeholder name is never overwritten, and a placeholder is never
  /// written over a real name.
  fn upsert_part(
    &self,
    part: CanonicalPart,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Design ids of parts whose name is empty or the placeholder name,
  /// ordered by design id.
  fn parts_with_placeholder_names(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// Apply late-arriving details: upgrade placeholder names and fill missing
  /// links. Returns the number of parts changed.
  fn fill_part_details(
    &self,
    details: Vec<PartDetails>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Aliases ───────────────────────────────────────────────────────────

  /// Retrieve the alias row for `alias_id`. Returns `None` if not found.
  fn get_alias<'a>(
    &'a self,
    alias_id: &'a str,
  ) -> impl Future<Output = Result<Option<PartAlias>, Self::Error>> + Send + 'a;

  /// Resolve a foreign id to a canonical design id: an alias row first, then
  /// a part whose own id matches.
  fn resolve_part<'a>(
    &'a self,
    alias_id: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// Alias ids of all placeholders (`alias_id == design_id`), ordered by
  /// alias id.
  fn placeholder_aliases(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// Register `alias_id` as a placeholder: a part row named `name` and a
  /// self-alias. Existing rows are left untouched.
  fn register_placeholder(
    &self,
    alias_id: String,
    name: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Migration ─────────────────────────────────────────────────────────

  /// Apply a batch of resolved aliases in one transaction, each alias in its
  /// own savepoint. Per alias, in order: ensure the canonical part, record
  /// the alias, rewrite inventory rows, delete the placeholder part.
  ///
  /// Idempotent: re-applying a migration changes nothing. A failing alias is
  /// rolled back alone and reported as [`MigrationOutcome::Failed`]. The
  /// outer `Err` is reserved for failures of the batch transaction itself.
  fn commit_migrations(
    &self,
    run_id: String,
    batch: Vec<Migration>,
  ) -> impl Future<Output = Result<Vec<MigrationOutcome>, Self::Error>> + Send + '_;

  /// The migration log, oldest first.
  fn migration_log(
    &self,
  ) -> impl Future<Output = Result<Vec<MigrationRecord>, Self::Error>> + Send + '_;

  // ── Colours ───────────────────────────────────────────────────────────

  /// Insert a colour; an existing colour with the same id is left as is.
  fn upsert_color(
    &self,
    color: Color,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Record a BrickLink colour alias (insert-if-absent).
  fn record_color_alias(
    &self,
    alias: ColorAlias,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Resolve a BrickLink colour id to a canonical colour id.
  fn resolve_color(
    &self,
    alias_id: i64,
  ) -> impl Future<Output = Result<Option<i64>, Self::Error>> + Send + '_;

  // ── Inventory ─────────────────────────────────────────────────────────

  /// Insert an inventory row and return its id.
  fn insert_inventory(
    &self,
    row: NewInventoryRow,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  /// All inventory rows for `design_id`, ordered by id.
  fn inventory_for_design<'a>(
    &'a self,
    design_id: &'a str,
  ) -> impl Future<Output = Result<Vec<InventoryRow>, Self::Error>> + Send + 'a;

  /// Total quantity across all rows for `design_id`.
  fn quantity_for_design<'a>(
    &'a self,
    design_id: &'a str,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + 'a;

  /// Inventory rows whose `design_id` has no part row.
  fn orphaned_inventory(
    &self,
  ) -> impl Future<Output = Result<Vec<InventoryRow>, Self::Error>> + Send + '_;
}

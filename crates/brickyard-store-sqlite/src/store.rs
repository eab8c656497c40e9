//! [`SqliteStore`]: the SQLite implementation of [`CatalogStore`].

use std::path::Path;

use brickyard_core::{
  catalog::{
    CanonicalPart, Color, ColorAlias, InventoryRow, Migration, MigrationOutcome,
    MigrationRecord, NewInventoryRow, PLACEHOLDER_NAME, PartAlias, PartDetails,
  },
  store::CatalogStore,
};
use chrono::Utc;
use rusqlite::{OptionalExtension as _, params};

use crate::{
  Error, Result,
  encode::{
    INVENTORY_COLUMNS, PART_COLUMNS, RawInventoryRow, RawMigrationRecord,
    RawPart, encode_dt, encode_status,
  },
  migrate,
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A brickyard catalog backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── CatalogStore impl ───────────────────────────────────────────────────────

impl CatalogStore for SqliteStore {
  type Error = Error;

  // ── Parts ─────────────────────────────────────────────────────────────────

  async fn get_part(&self, design_id: &str) -> Result<Option<CanonicalPart>> {
    let id = design_id.to_owned();
    let raw = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            &format!("SELECT {PART_COLUMNS} FROM parts WHERE design_id = ?1"),
            params![id],
            RawPart::from_row,
          )
          .optional()?;
        Ok(raw)
      })
      .await?;
    Ok(raw.map(RawPart::into_part))
  }

  async fn upsert_part(&self, part: CanonicalPart) -> Result<()> {
    if part.design_id.trim().is_empty() {
      return Err(Error::BlankIdentifier);
    }
    self
      .conn
      .call(move |conn| {
        migrate::upsert_part(conn, &part)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn parts_with_placeholder_names(&self) -> Result<Vec<String>> {
    let ids = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT design_id FROM parts
           WHERE TRIM(name) = '' OR name = ?1
           ORDER BY design_id",
        )?;
        let ids = stmt
          .query_map(params![PLACEHOLDER_NAME], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(ids)
      })
      .await?;
    Ok(ids)
  }

  async fn fill_part_details(&self, details: Vec<PartDetails>) -> Result<usize> {
    if details.is_empty() {
      return Ok(0);
    }
    let changed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut changed = 0;
        {
          let mut stmt = tx.prepare(
            "UPDATE parts SET
               name      = CASE WHEN ?2 IS NOT NULL AND (TRIM(name) = '' OR name = ?5)
                                THEN ?2 ELSE name END,
               url       = COALESCE(url, ?3),
               image_url = COALESCE(image_url, ?4)
             WHERE design_id = ?1
               AND (  (?2 IS NOT NULL AND (TRIM(name) = '' OR name = ?5))
                   OR (url IS NULL AND ?3 IS NOT NULL)
                   OR (image_url IS NULL AND ?4 IS NOT NULL))",
          )?;
          for d in &details {
            let name = d
              .name
              .as_deref()
              .filter(|n| !brickyard_core::catalog::is_placeholder_name(n));
            changed += stmt.execute(params![
              d.design_id,
              name,
              d.url,
              d.image_url,
              PLACEHOLDER_NAME,
            ])?;
          }
        }
        tx.commit()?;
        Ok(changed)
      })
      .await?;
    Ok(changed)
  }

  // ── Aliases ───────────────────────────────────────────────────────────────

  async fn get_alias(&self, alias_id: &str) -> Result<Option<PartAlias>> {
    let id = alias_id.to_owned();
    let alias = self
      .conn
      .call(move |conn| {
        let alias = conn
          .query_row(
            "SELECT alias_id, design_id FROM part_aliases WHERE alias_id = ?1",
            params![id],
            |r| Ok(PartAlias { alias_id: r.get(0)?, design_id: r.get(1)? }),
          )
          .optional()?;
        Ok(alias)
      })
      .await?;
    Ok(alias)
  }

  async fn resolve_part(&self, alias_id: &str) -> Result<Option<String>> {
    let id = alias_id.to_owned();
    let design = self
      .conn
      .call(move |conn| {
        let via_alias: Option<String> = conn
          .query_row(
            "SELECT design_id FROM part_aliases WHERE alias_id = ?1",
            params![id],
            |r| r.get(0),
          )
          .optional()?;
        if via_alias.is_some() {
          return Ok(via_alias);
        }
        let direct: Option<String> = conn
          .query_row(
            "SELECT design_id FROM parts WHERE design_id = ?1",
            params![id],
            |r| r.get(0),
          )
          .optional()?;
        Ok(direct)
      })
      .await?;
    Ok(design)
  }

  async fn placeholder_aliases(&self) -> Result<Vec<String>> {
    let ids = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT alias_id FROM part_aliases
           WHERE alias_id = design_id
           ORDER BY alias_id",
        )?;
        let ids = stmt
          .query_map([], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(ids)
      })
      .await?;
    Ok(ids)
  }

  async fn register_placeholder(&self, alias_id: String, name: String) -> Result<()> {
    let alias_id = alias_id.trim().to_owned();
    if alias_id.is_empty() {
      return Err(Error::BlankIdentifier);
    }
    let name = if brickyard_core::catalog::is_placeholder_name(&name) {
      PLACEHOLDER_NAME.to_owned()
    } else {
      name.trim().to_owned()
    };
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT OR IGNORE INTO parts (design_id, name) VALUES (?1, ?2)",
          params![alias_id, name],
        )?;
        tx.execute(
          "INSERT OR IGNORE INTO part_aliases (alias_id, design_id) VALUES (?1, ?1)",
          params![alias_id],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Migration ─────────────────────────────────────────────────────────────

  async fn commit_migrations(
    &self,
    run_id: String,
    batch: Vec<Migration>,
  ) -> Result<Vec<MigrationOutcome>> {
    if batch.is_empty() {
      return Ok(Vec::new());
    }
    let now = encode_dt(Utc::now());
    let outcomes = self
      .conn
      .call(move |conn| {
        let mut tx = conn.transaction()?;
        let mut outcomes = Vec::with_capacity(batch.len());
        for migration in &batch {
          let sp = tx.savepoint()?;
          match migrate::apply(&sp, &run_id, &now, migration) {
            Ok(outcome) => {
              sp.commit()?;
              outcomes.push(outcome);
            }
            Err(e) => {
              // Dropping the savepoint rolls this alias back.
              drop(sp);
              tracing::warn!(alias = %migration.alias_id, error = %e, "migration rolled back");
              outcomes.push(MigrationOutcome::Failed { error: e.to_string() });
            }
          }
        }
        tx.commit()?;
        Ok(outcomes)
      })
      .await?;
    Ok(outcomes)
  }

  async fn migration_log(&self) -> Result<Vec<MigrationRecord>> {
    let raws = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT run_id, alias_id, design_id, source, rows_moved, migrated_at
           FROM alias_migrations ORDER BY id",
        )?;
        let raws = stmt
          .query_map([], RawMigrationRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(raws)
      })
      .await?;
    Ok(raws.into_iter().map(RawMigrationRecord::into_record).collect())
  }

  // ── Colours ───────────────────────────────────────────────────────────────

  async fn upsert_color(&self, color: Color) -> Result<()> {
    let (r, g, b) = color.rgb();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO colors (id, name, hex, r, g, b)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          params![color.id, color.name, color.hex, r, g, b],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn record_color_alias(&self, alias: ColorAlias) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO color_aliases (alias_id, color_id) VALUES (?1, ?2)",
          params![alias.alias_id, alias.color_id],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn resolve_color(&self, alias_id: i64) -> Result<Option<i64>> {
    let id = self
      .conn
      .call(move |conn| {
        let id = conn
          .query_row(
            "SELECT color_id FROM color_aliases WHERE alias_id = ?1",
            params![alias_id],
            |r| r.get(0),
          )
          .optional()?;
        Ok(id)
      })
      .await?;
    Ok(id)
  }

  // ── Inventory ─────────────────────────────────────────────────────────────

  async fn insert_inventory(&self, row: NewInventoryRow) -> Result<i64> {
    if row.quantity < 0 {
      return Err(Error::NegativeQuantity {
        design_id: row.design_id,
        quantity:  row.quantity,
      });
    }
    let status = encode_status(&row.status);
    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO inventory
             (design_id, color_id, quantity, status, drawer, container, set_number)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          params![
            row.design_id,
            row.color_id,
            row.quantity,
            status,
            row.drawer,
            row.container,
            row.set_number,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;
    Ok(id)
  }

  async fn inventory_for_design(&self, design_id: &str) -> Result<Vec<InventoryRow>> {
    let id = design_id.to_owned();
    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {INVENTORY_COLUMNS} FROM inventory i
           WHERE i.design_id = ?1 ORDER BY i.id"
        ))?;
        let raws = stmt
          .query_map(params![id], RawInventoryRow::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(raws)
      })
      .await?;
    Ok(raws.into_iter().map(RawInventoryRow::into_row).collect())
  }

  async fn quantity_for_design(&self, design_id: &str) -> Result<i64> {
    let id = design_id.to_owned();
    let total = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          "SELECT COALESCE(SUM(quantity), 0) FROM inventory WHERE design_id = ?1",
          params![id],
          |r| r.get(0),
        )?;
        Ok(total)
      })
      .await?;
    Ok(total)
  }

  async fn orphaned_inventory(&self) -> Result<Vec<InventoryRow>> {
    let raws = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {INVENTORY_COLUMNS} FROM inventory i
           LEFT JOIN parts p ON p.design_id = i.design_id
           WHERE p.design_id IS NULL
           ORDER BY i.id"
        ))?;
        let raws = stmt
          .query_map([], RawInventoryRow::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(raws)
      })
      .await?;
    Ok(raws.into_iter().map(RawInventoryRow::into_row).collect())
  }
}

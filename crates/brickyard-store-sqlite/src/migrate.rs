//! Per-alias migration statements, run inside a savepoint by
//! [`crate::SqliteStore`].

use brickyard_core::catalog::{
  CanonicalPart, Migration, MigrationOutcome, PLACEHOLDER_NAME,
};
use rusqlite::{Connection, OptionalExtension as _, params};

/// Insert `part`, or upgrade an existing row whose name is still a
/// placeholder and whose links are missing. Never downgrades.
pub fn upsert_part(conn: &Connection, part: &CanonicalPart) -> rusqlite::Result<usize> {
  let name = if part.has_placeholder_name() {
    PLACEHOLDER_NAME
  } else {
    part.name.as_str()
  };
  conn.execute(
    "INSERT INTO parts (design_id, name, url, image_url)
     VALUES (?1, ?2, ?3, ?4)
     ON CONFLICT(design_id) DO UPDATE SET
       name      = CASE WHEN (TRIM(parts.name) = '' OR parts.name = ?5)
                          AND excluded.name != ?5
                        THEN excluded.name ELSE parts.name END,
       url       = COALESCE(parts.url, excluded.url),
       image_url = COALESCE(parts.image_url, excluded.image_url)
     WHERE ((TRIM(parts.name) = '' OR parts.name = ?5) AND excluded.name != ?5)
        OR (parts.url IS NULL AND excluded.url IS NOT NULL)
        OR (parts.image_url IS NULL AND excluded.image_url IS NOT NULL)",
    params![part.design_id, name, part.url, part.image_url, PLACEHOLDER_NAME],
  )
}

/// Apply one migration. The caller owns the surrounding savepoint; an `Err`
/// here means it must be rolled back.
pub fn apply(
  conn: &Connection,
  run_id: &str,
  now: &str,
  migration: &Migration,
) -> rusqlite::Result<MigrationOutcome> {
  let alias = migration.alias_id.as_str();
  let design = migration.part.design_id.as_str();

  let existing: Option<String> = conn
    .query_row(
      "SELECT design_id FROM part_aliases WHERE alias_id = ?1",
      params![alias],
      |r| r.get(0),
    )
    .optional()?;
  let was_placeholder = existing.as_deref() == Some(alias);

  if let Some(current) = existing.as_deref()
    && !was_placeholder
    && current != design
  {
    return Ok(MigrationOutcome::Skipped { existing: current.to_owned() });
  }

  upsert_part(conn, &migration.part)?;

  if migration.is_identity() {
    let retired = conn.execute(
      "DELETE FROM part_aliases WHERE alias_id = ?1 AND design_id = ?1",
      params![alias],
    )?;
    if retired > 0 {
      log(conn, run_id, now, migration, 0)?;
    }
    return Ok(MigrationOutcome::ConfirmedCanonical);
  }

  // A real mapping that already exists is left alone; only the placeholder
  // is upgraded.
  conn.execute(
    "INSERT INTO part_aliases (alias_id, design_id) VALUES (?1, ?2)
     ON CONFLICT(alias_id) DO UPDATE SET design_id = excluded.design_id
     WHERE part_aliases.design_id = part_aliases.alias_id",
    params![alias, design],
  )?;

  // Aliases chained onto the placeholder follow it.
  conn.execute(
    "UPDATE part_aliases SET design_id = ?1 WHERE design_id = ?2 AND alias_id != ?2",
    params![design, alias],
  )?;

  let moved = conn.execute(
    "UPDATE inventory SET design_id = ?1 WHERE design_id = ?2",
    params![design, alias],
  )?;

  if was_placeholder {
    conn.execute("DELETE FROM parts WHERE design_id = ?1", params![alias])?;
  }

  if existing.is_none() || was_placeholder || moved > 0 {
    log(conn, run_id, now, migration, moved)?;
  }

  Ok(MigrationOutcome::Migrated { rows_moved: moved })
}

fn log(
  conn: &Connection,
  run_id: &str,
  now: &str,
  migration: &Migration,
  rows_moved: usize,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO alias_migrations
       (run_id, alias_id, design_id, source, rows_moved, migrated_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    params![
      run_id,
      migration.alias_id,
      migration.part.design_id,
      migration.source,
      rows_moved as i64,
      now,
    ],
  )?;
  Ok(())
}

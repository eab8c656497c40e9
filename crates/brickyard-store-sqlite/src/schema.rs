//! SQL schema for the brickyard SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS parts (
    design_id TEXT PRIMARY KEY,
    name      TEXT NOT NULL,
    url       TEXT,
    image_url TEXT
);

-- alias_id = design_id marks a placeholder.
CREATE TABLE IF NOT EXISTS part_aliases (
    alias_id  TEXT PRIMARY KEY,
    design_id TEXT NOT NULL REFERENCES parts(design_id)
);

CREATE TABLE IF NOT EXISTS colors (
    id   INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    hex  TEXT NOT NULL,
    r    INTEGER,
    g    INTEGER,
    b    INTEGER
);

CREATE TABLE IF NOT EXISTS color_aliases (
    alias_id INTEGER PRIMARY KEY,
    color_id INTEGER NOT NULL REFERENCES colors(id)
);

-- Inventory references canonical ids only, never an alias.
CREATE TABLE IF NOT EXISTS inventory (
    id         INTEGER PRIMARY KEY,
    design_id  TEXT    NOT NULL REFERENCES parts(design_id),
    color_id   INTEGER NOT NULL REFERENCES colors(id),
    quantity   INTEGER NOT NULL CHECK (quantity >= 0),
    status     TEXT    NOT NULL DEFAULT 'loose',
    drawer     TEXT,
    container  TEXT,
    set_number TEXT
);

-- Append-only; one row per alias actually migrated.
CREATE TABLE IF NOT EXISTS alias_migrations (
    id          INTEGER PRIMARY KEY,
    run_id      TEXT    NOT NULL,
    alias_id    TEXT    NOT NULL,
    design_id   TEXT    NOT NULL,
    source      TEXT    NOT NULL,
    rows_moved  INTEGER NOT NULL,
    migrated_at TEXT    NOT NULL   -- ISO 8601 UTC
);

CREATE INDEX IF NOT EXISTS inventory_design_idx    ON inventory(design_id);
CREATE INDEX IF NOT EXISTS part_aliases_design_idx ON part_aliases(design_id);
CREATE INDEX IF NOT EXISTS alias_migrations_run_idx ON alias_migrations(run_id);

PRAGMA user_version = 1;
";

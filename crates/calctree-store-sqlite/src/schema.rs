//! SQL schema for the calculation tree SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision so later migrations can be gated on it.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Usernames are compared case-sensitively (BINARY collation).
CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,      -- argon2 PHC string
    created_at    TEXT NOT NULL       -- RFC 3339 UTC, fixed microsecond width
);

-- Calculations are append-only; rows are only ever removed by cascade.
-- AUTOINCREMENT keeps ids strictly increasing, so a parent always has a
-- smaller id than its children.
CREATE TABLE IF NOT EXISTS calculations (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    parent_id   INTEGER REFERENCES calculations(id) ON DELETE CASCADE,
    operation   TEXT CHECK (operation IN ('add', 'subtract', 'multiply', 'divide')),
    number      REAL NOT NULL,
    result      REAL NOT NULL,
    created_at  TEXT NOT NULL,
    CHECK ((parent_id IS NULL) = (operation IS NULL))
);

CREATE INDEX IF NOT EXISTS calculations_parent_idx  ON calculations(parent_id);
CREATE INDEX IF NOT EXISTS calculations_created_idx ON calculations(created_at);

PRAGMA user_version = 1;
";

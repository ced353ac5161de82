//! SQL schema for the journal SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE COLLATE NOCASE,
    display_name  TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    is_admin      INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL      -- RFC 3339 UTC; server-assigned
);

-- Only the SHA-256 digest of the bearer token is stored.
CREATE TABLE IF NOT EXISTS sessions (
    token_hash TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS entry_types (
    entry_type_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS emotions (
    emotion_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name       TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS entries (
    entry_id      INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id       TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    title         TEXT NOT NULL,
    content       TEXT NOT NULL,
    recipient     TEXT NOT NULL DEFAULT '',
    entry_type_id INTEGER NOT NULL
                  REFERENCES entry_types(entry_type_id) ON DELETE RESTRICT,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

-- rowid order is association order.
CREATE TABLE IF NOT EXISTS entry_emotions (
    entry_id   INTEGER NOT NULL REFERENCES entries(entry_id) ON DELETE CASCADE,
    emotion_id INTEGER NOT NULL REFERENCES emotions(emotion_id) ON DELETE CASCADE,
    PRIMARY KEY (entry_id, emotion_id)
);

CREATE INDEX IF NOT EXISTS entries_owner_created_idx ON entries(user_id, created_at);
CREATE INDEX IF NOT EXISTS entries_type_idx          ON entries(entry_type_id);
CREATE INDEX IF NOT EXISTS entry_emotions_emotion_idx ON entry_emotions(emotion_id);
CREATE INDEX IF NOT EXISTS sessions_user_idx         ON sessions(user_id);

PRAGMA user_version = 1;
";

//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 UTC strings with a fixed microsecond
//! precision, so lexical order matches chronological order. UUIDs are stored
//! as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use journal_core::{
  catalog::{Emotion, EntryType},
  entry::Entry,
  user::{Session, User},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// The current time truncated to the stored precision, so values handed back
/// to callers equal what a later read returns.
pub fn now() -> DateTime<Utc> {
  let now = Utc::now();
  decode_dt(&encode_dt(now)).unwrap_or(now)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `users` row.
pub struct RawUser {
  pub user_id:      String,
  pub email:        String,
  pub display_name: String,
  pub is_admin:     bool,
  pub created_at:   String,
}

/// Column list matching [`RawUser::from_row`]; expects `users u`.
pub const USER_COLUMNS: &str = "u.user_id, u.email, u.display_name, u.is_admin, u.created_at";

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:      row.get(0)?,
      email:        row.get(1)?,
      display_name: row.get(2)?,
      is_admin:     row.get(3)?,
      created_at:   row.get(4)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:           decode_uuid(&self.user_id)?,
      email:        self.email,
      display_name: self.display_name,
      is_admin:     self.is_admin,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `sessions` row.
pub struct RawSession {
  pub token_hash: String,
  pub user_id:    String,
  pub created_at: String,
  pub expires_at: String,
}

impl RawSession {
  pub fn into_session(self) -> Result<Session> {
    Ok(Session {
      token_hash: self.token_hash,
      user_id:    decode_uuid(&self.user_id)?,
      created_at: decode_dt(&self.created_at)?,
      expires_at: decode_dt(&self.expires_at)?,
    })
  }
}

/// Raw values from an `entries` row joined with its entry type.
pub struct RawEntry {
  pub entry_id:        i64,
  pub user_id:         String,
  pub title:           String,
  pub content:         String,
  pub recipient:       String,
  pub entry_type_id:   i64,
  pub entry_type_name: String,
  pub created_at:      String,
  pub updated_at:      String,
}

/// Select list matching [`RawEntry::from_row`]; expects `entries e` joined
/// with `entry_types t`.
pub const ENTRY_COLUMNS: &str = "e.entry_id, e.user_id, e.title, e.content, e.recipient,
   t.entry_type_id, t.name, e.created_at, e.updated_at";

impl RawEntry {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      entry_id:        row.get(0)?,
      user_id:         row.get(1)?,
      title:           row.get(2)?,
      content:         row.get(3)?,
      recipient:       row.get(4)?,
      entry_type_id:   row.get(5)?,
      entry_type_name: row.get(6)?,
      created_at:      row.get(7)?,
      updated_at:      row.get(8)?,
    })
  }

  /// Combine with the entry's emotions (already in association order).
  pub fn into_entry(self, emotions: Vec<Emotion>) -> Result<Entry> {
    Ok(Entry {
      id:         self.entry_id,
      owner_id:   decode_uuid(&self.user_id)?,
      title:      self.title,
      content:    self.content,
      recipient:  self.recipient,
      entry_type: EntryType { id: self.entry_type_id, name: self.entry_type_name },
      emotions,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

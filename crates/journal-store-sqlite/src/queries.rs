//! Synchronous query functions run on the connection thread.
//!
//! Every mutation opens its own transaction. Returning early drops the
//! transaction, which rolls it back.

use chrono::{DateTime, Utc};
use journal_core::{
  Error as CoreError,
  access::Caller,
  catalog::{Emotion, EntryType},
  entry::{Entry, EntryDraft, EntryInput},
  query::{EntryTypeCount, PageRequest, TOP_ENTRY_TYPES},
  user::{Session, User, UserCredentials, UserSummary},
};
use rusqlite::{Connection, OptionalExtension as _, params};
use uuid::Uuid;

use crate::{
  Result,
  encode::{
    ENTRY_COLUMNS, RawEntry, RawSession, RawUser, USER_COLUMNS, decode_dt,
    encode_dt, encode_uuid, now,
  },
};

// ─── Users ───────────────────────────────────────────────────────────────────

pub fn user_by_id(conn: &Connection, id: Uuid) -> Result<Option<User>> {
  let raw = conn
    .query_row(
      &format!("SELECT {USER_COLUMNS} FROM users u WHERE u.user_id = ?1"),
      params![encode_uuid(id)],
      RawUser::from_row,
    )
    .optional()?;
  raw.map(RawUser::into_user).transpose()
}

pub fn insert_user(conn: &mut Connection, user: &User, password_hash: &str) -> Result<()> {
  let tx = conn.transaction()?;

  let taken = tx
    .query_row(
      "SELECT 1 FROM users WHERE email = ?1",
      params![user.email],
      |_| Ok(()),
    )
    .optional()?
    .is_some();
  if taken {
    return Err(
      CoreError::Conflict("A user with this email already exists.".to_owned()).into(),
    );
  }

  tx.execute(
    "INSERT INTO users (user_id, email, display_name, password_hash, is_admin, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    params![
      encode_uuid(user.id),
      user.email,
      user.display_name,
      password_hash,
      user.is_admin,
      encode_dt(user.created_at),
    ],
  )?;
  tx.commit()?;
  Ok(())
}

pub fn credentials_by_email(conn: &Connection, email: &str) -> Result<Option<UserCredentials>> {
  let raw = conn
    .query_row(
      &format!("SELECT {USER_COLUMNS}, u.password_hash FROM users u WHERE u.email = ?1"),
      params![email],
      |row| Ok((RawUser::from_row(row)?, row.get::<_, String>(5)?)),
    )
    .optional()?;

  raw
    .map(|(user, password_hash)| {
      Ok(UserCredentials { user: user.into_user()?, password_hash })
    })
    .transpose()
}

pub fn set_display_name(conn: &Connection, id: Uuid, display_name: &str) -> Result<Option<User>> {
  let changed = conn.execute(
    "UPDATE users SET display_name = ?2 WHERE user_id = ?1",
    params![encode_uuid(id), display_name],
  )?;
  if changed == 0 {
    return Ok(None);
  }
  user_by_id(conn, id)
}

/// Entries, associations and sessions go with the user via `ON DELETE
/// CASCADE`.
pub fn remove_user(conn: &Connection, id: Uuid) -> Result<bool> {
  let removed = conn.execute("DELETE FROM users WHERE user_id = ?1", params![encode_uuid(id)])?;
  Ok(removed > 0)
}

fn summary_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(RawUser, i64, Option<String>)> {
  Ok((RawUser::from_row(row)?, row.get(5)?, row.get(6)?))
}

fn into_summary(
  (user, entry_count, last_entry_at): (RawUser, i64, Option<String>),
) -> Result<UserSummary> {
  Ok(UserSummary {
    user:          user.into_user()?,
    entry_count:   entry_count as u64,
    last_entry_at: last_entry_at.as_deref().map(decode_dt).transpose()?,
  })
}

pub fn user_summaries(conn: &Connection) -> Result<Vec<UserSummary>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {USER_COLUMNS}, COUNT(e.entry_id), MAX(e.created_at)
     FROM users u
     LEFT JOIN entries e ON e.user_id = u.user_id
     GROUP BY u.user_id
     ORDER BY u.display_name, u.created_at"
  ))?;
  let rows = stmt
    .query_map([], summary_from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  rows.into_iter().map(into_summary).collect()
}

pub fn user_summary(conn: &Connection, id: Uuid) -> Result<Option<UserSummary>> {
  let row = conn
    .query_row(
      &format!(
        "SELECT {USER_COLUMNS},
           (SELECT COUNT(*) FROM entries e WHERE e.user_id = u.user_id),
           NULL
         FROM users u WHERE u.user_id = ?1"
      ),
      params![encode_uuid(id)],
      summary_from_row,
    )
    .optional()?;
  row.map(into_summary).transpose()
}

pub fn count_users(conn: &Connection) -> Result<u64> {
  let n: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?;
  Ok(n as u64)
}

// ─── Sessions ────────────────────────────────────────────────────────────────

pub fn insert_session(conn: &Connection, session: &Session) -> Result<()> {
  conn.execute(
    "INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
     VALUES (?1, ?2, ?3, ?4)",
    params![
      session.token_hash,
      encode_uuid(session.user_id),
      encode_dt(session.created_at),
      encode_dt(session.expires_at),
    ],
  )?;
  Ok(())
}

pub fn session_by_hash(conn: &Connection, token_hash: &str) -> Result<Option<Session>> {
  let raw = conn
    .query_row(
      "SELECT token_hash, user_id, created_at, expires_at FROM sessions WHERE token_hash = ?1",
      params![token_hash],
      |row| {
        Ok(RawSession {
          token_hash: row.get(0)?,
          user_id:    row.get(1)?,
          created_at: row.get(2)?,
          expires_at: row.get(3)?,
        })
      },
    )
    .optional()?;
  raw.map(RawSession::into_session).transpose()
}

pub fn set_session_expiry(conn: &Connection, token_hash: &str, expires_at: DateTime<Utc>) -> Result<()> {
  conn.execute(
    "UPDATE sessions SET expires_at = ?2 WHERE token_hash = ?1",
    params![token_hash, encode_dt(expires_at)],
  )?;
  Ok(())
}

pub fn remove_session(conn: &Connection, token_hash: &str) -> Result<()> {
  conn.execute("DELETE FROM sessions WHERE token_hash = ?1", params![token_hash])?;
  Ok(())
}

pub fn purge_sessions(conn: &Connection, now: DateTime<Utc>) -> Result<u64> {
  let removed = conn.execute(
    "DELETE FROM sessions WHERE expires_at <= ?1",
    params![encode_dt(now)],
  )?;
  Ok(removed as u64)
}

// ─── Catalogs ────────────────────────────────────────────────────────────────

/// The two lookup tables share a layout.
#[derive(Debug, Clone, Copy)]
pub enum Catalog {
  EntryTypes,
  Emotions,
}

impl Catalog {
  fn table(self) -> &'static str {
    match self {
      Catalog::EntryTypes => "entry_types",
      Catalog::Emotions => "emotions",
    }
  }

  fn id_column(self) -> &'static str {
    match self {
      Catalog::EntryTypes => "entry_type_id",
      Catalog::Emotions => "emotion_id",
    }
  }
}

pub fn seed_catalog(conn: &mut Connection, catalog: Catalog, names: &[String]) -> Result<u64> {
  let tx = conn.transaction()?;
  let mut inserted = 0;
  {
    let mut stmt = tx.prepare(&format!(
      "INSERT OR IGNORE INTO {} (name) VALUES (?1)",
      catalog.table()
    ))?;
    for name in names {
      inserted += stmt.execute(params![name])? as u64;
    }
  }
  tx.commit()?;
  Ok(inserted)
}

fn catalog_rows(conn: &Connection, catalog: Catalog) -> Result<Vec<(i64, String)>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {}, name FROM {} ORDER BY name",
    catalog.id_column(),
    catalog.table()
  ))?;
  let rows = stmt
    .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

pub fn entry_types(conn: &Connection) -> Result<Vec<EntryType>> {
  Ok(
    catalog_rows(conn, Catalog::EntryTypes)?
      .into_iter()
      .map(|(id, name)| EntryType { id, name })
      .collect(),
  )
}

pub fn emotions(conn: &Connection) -> Result<Vec<Emotion>> {
  Ok(
    catalog_rows(conn, Catalog::Emotions)?
      .into_iter()
      .map(|(id, name)| Emotion { id, name })
      .collect(),
  )
}

fn catalog_row_exists(conn: &Connection, catalog: Catalog, id: i64) -> Result<bool> {
  Ok(
    conn
      .query_row(
        &format!(
          "SELECT 1 FROM {} WHERE {} = ?1",
          catalog.table(),
          catalog.id_column()
        ),
        params![id],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

/// Restricted: refuses while any entry references the type.
pub fn remove_entry_type(conn: &mut Connection, id: i64) -> Result<()> {
  let tx = conn.transaction()?;
  if !catalog_row_exists(&tx, Catalog::EntryTypes, id)? {
    return Err(CoreError::NotFound(format!("entry type {id}")).into());
  }
  let references: i64 = tx.query_row(
    "SELECT COUNT(*) FROM entries WHERE entry_type_id = ?1",
    params![id],
    |r| r.get(0),
  )?;
  if references > 0 {
    return Err(
      CoreError::Conflict(format!(
        "entry type {id} is still used by {references} entries"
      ))
      .into(),
    );
  }
  tx.execute("DELETE FROM entry_types WHERE entry_type_id = ?1", params![id])?;
  tx.commit()?;
  Ok(())
}

/// Associations to the emotion cascade away; the entries themselves stay.
pub fn remove_emotion(conn: &Connection, id: i64) -> Result<()> {
  let removed = conn.execute("DELETE FROM emotions WHERE emotion_id = ?1", params![id])?;
  if removed == 0 {
    return Err(CoreError::NotFound(format!("emotion {id}")).into());
  }
  Ok(())
}

// ─── Entries ─────────────────────────────────────────────────────────────────

fn check_references(conn: &Connection, draft: &EntryDraft) -> Result<()> {
  if !catalog_row_exists(conn, Catalog::EntryTypes, draft.entry_type_id)? {
    return Err(
      CoreError::Reference(format!("entry type {} does not exist", draft.entry_type_id))
        .into(),
    );
  }
  for id in &draft.emotion_ids {
    if !catalog_row_exists(conn, Catalog::Emotions, *id)? {
      return Err(CoreError::Reference(format!("emotion {id} does not exist")).into());
    }
  }
  Ok(())
}

fn insert_associations(conn: &Connection, entry_id: i64, emotion_ids: &[i64]) -> Result<()> {
  let mut stmt =
    conn.prepare_cached("INSERT INTO entry_emotions (entry_id, emotion_id) VALUES (?1, ?2)")?;
  for emotion_id in emotion_ids {
    stmt.execute(params![entry_id, emotion_id])?;
  }
  Ok(())
}

fn emotions_of(conn: &Connection, entry_id: i64) -> Result<Vec<Emotion>> {
  let mut stmt = conn.prepare_cached(
    "SELECT em.emotion_id, em.name
     FROM entry_emotions ee
     JOIN emotions em ON em.emotion_id = ee.emotion_id
     WHERE ee.entry_id = ?1
     ORDER BY ee.rowid",
  )?;
  let emotions = stmt
    .query_map(params![entry_id], |row| {
      Ok(Emotion { id: row.get(0)?, name: row.get(1)? })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(emotions)
}

fn hydrate(conn: &Connection, raw: RawEntry) -> Result<Entry> {
  let emotions = emotions_of(conn, raw.entry_id)?;
  raw.into_entry(emotions)
}

fn load_entry(conn: &Connection, id: i64) -> Result<Option<Entry>> {
  let raw = conn
    .query_row(
      &format!(
        "SELECT {ENTRY_COLUMNS}
         FROM entries e
         JOIN entry_types t ON t.entry_type_id = e.entry_type_id
         WHERE e.entry_id = ?1"
      ),
      params![id],
      RawEntry::from_row,
    )
    .optional()?;
  raw.map(|raw| hydrate(conn, raw)).transpose()
}

fn owner_of(conn: &Connection, id: i64) -> Result<Uuid> {
  let owner: Option<String> = conn
    .query_row(
      "SELECT user_id FROM entries WHERE entry_id = ?1",
      params![id],
      |r| r.get(0),
    )
    .optional()?;
  let owner = owner.ok_or_else(|| CoreError::NotFound(format!("entry {id}")))?;
  Ok(Uuid::parse_str(&owner)?)
}

fn reload(conn: &Connection, id: i64) -> Result<Entry> {
  Ok(load_entry(conn, id)?.ok_or_else(|| CoreError::NotFound(format!("entry {id}")))?)
}

pub fn create_entry(conn: &mut Connection, caller: Caller, input: EntryInput) -> Result<Entry> {
  let draft = input.validate()?;
  let tx = conn.transaction()?;
  check_references(&tx, &draft)?;

  let stamp = encode_dt(now());
  tx.execute(
    "INSERT INTO entries (user_id, title, content, recipient, entry_type_id, created_at, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
    params![
      encode_uuid(caller.user_id),
      draft.title,
      draft.content,
      draft.recipient,
      draft.entry_type_id,
      stamp,
    ],
  )?;
  let id = tx.last_insert_rowid();
  insert_associations(&tx, id, &draft.emotion_ids)?;

  let entry = reload(&tx, id)?;
  tx.commit()?;
  Ok(entry)
}

pub fn get_entry(conn: &Connection, caller: Caller, id: i64) -> Result<Entry> {
  let entry = reload(conn, id)?;
  caller.authorize_read(entry.owner_id)?;
  Ok(entry)
}

pub fn update_entry(
  conn: &mut Connection,
  caller: Caller,
  id: i64,
  input: EntryInput,
) -> Result<Entry> {
  let tx = conn.transaction()?;
  caller.authorize_update(owner_of(&tx, id)?)?;
  let draft = input.validate()?;
  check_references(&tx, &draft)?;

  tx.execute(
    "UPDATE entries
     SET title = ?2, content = ?3, recipient = ?4, entry_type_id = ?5, updated_at = ?6
     WHERE entry_id = ?1",
    params![
      id,
      draft.title,
      draft.content,
      draft.recipient,
      draft.entry_type_id,
      encode_dt(now()),
    ],
  )?;
  tx.execute("DELETE FROM entry_emotions WHERE entry_id = ?1", params![id])?;
  insert_associations(&tx, id, &draft.emotion_ids)?;

  let entry = reload(&tx, id)?;
  tx.commit()?;
  Ok(entry)
}

pub fn delete_entry(conn: &mut Connection, caller: Caller, id: i64) -> Result<()> {
  let tx = conn.transaction()?;
  caller.authorize_delete(owner_of(&tx, id)?)?;
  tx.execute("DELETE FROM entries WHERE entry_id = ?1", params![id])?;
  tx.commit()?;
  Ok(())
}

// ─── Queries ─────────────────────────────────────────────────────────────────

pub fn count_entries(conn: &Connection, owner_id: Uuid) -> Result<u64> {
  let n: i64 = conn.query_row(
    "SELECT COUNT(*) FROM entries WHERE user_id = ?1",
    params![encode_uuid(owner_id)],
    |r| r.get(0),
  )?;
  Ok(n as u64)
}

/// One page of the owner's entries plus the owner's total entry count, read
/// in a single transaction.
pub fn page_of_entries(
  conn: &mut Connection,
  owner_id: Uuid,
  page: PageRequest,
) -> Result<(Vec<Entry>, u64)> {
  let tx = conn.transaction()?;
  let total = count_entries(&tx, owner_id)?;

  let raws = {
    let mut stmt = tx.prepare(&format!(
      "SELECT {ENTRY_COLUMNS}
       FROM entries e
       JOIN entry_types t ON t.entry_type_id = e.entry_type_id
       WHERE e.user_id = ?1
       ORDER BY e.created_at DESC, e.entry_id DESC
       LIMIT ?2 OFFSET ?3"
    ))?;
    stmt
      .query_map(
        params![
          encode_uuid(owner_id),
          i64::from(page.page_size()),
          page.offset() as i64,
        ],
        RawEntry::from_row,
      )?
      .collect::<rusqlite::Result<Vec<_>>>()?
  };

  let entries = raws
    .into_iter()
    .map(|raw| hydrate(&tx, raw))
    .collect::<Result<Vec<_>>>()?;
  tx.commit()?;
  Ok((entries, total))
}

/// Emotion names of every association the owner has, entries newest first and
/// each entry's emotions in association order.
pub fn owner_emotion_names(conn: &Connection, owner_id: Uuid) -> Result<Vec<String>> {
  let mut stmt = conn.prepare(
    "SELECT em.name
     FROM entries e
     JOIN entry_emotions ee ON ee.entry_id = e.entry_id
     JOIN emotions em       ON em.emotion_id = ee.emotion_id
     WHERE e.user_id = ?1
     ORDER BY e.created_at DESC, e.entry_id DESC, ee.rowid",
  )?;
  let names = stmt
    .query_map(params![encode_uuid(owner_id)], |r| r.get(0))?
    .collect::<rusqlite::Result<Vec<String>>>()?;
  Ok(names)
}

pub fn count_all_entries(conn: &Connection) -> Result<u64> {
  let n: i64 = conn.query_row("SELECT COUNT(*) FROM entries", [], |r| r.get(0))?;
  Ok(n as u64)
}

/// Entry types ranked by usage; unused types are included with a zero count.
pub fn top_entry_types(conn: &Connection) -> Result<Vec<EntryTypeCount>> {
  let mut stmt = conn.prepare(
    "SELECT t.name, COUNT(e.entry_id) AS uses
     FROM entry_types t
     LEFT JOIN entries e ON e.entry_type_id = t.entry_type_id
     GROUP BY t.entry_type_id
     ORDER BY uses DESC, t.entry_type_id ASC
     LIMIT ?1",
  )?;
  let rows = stmt
    .query_map(params![TOP_ENTRY_TYPES as i64], |row| {
      let count: i64 = row.get(1)?;
      Ok(EntryTypeCount { entry_type: row.get(0)?, count: count as u64 })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

//! [`SqliteStore`]: the SQLite implementation of [`JournalStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use journal_core::{
  access::Caller,
  catalog::{Emotion, EntryType},
  entry::{Entry, EntryInput},
  query::{AdminStatistics, EmotionCount, Page, PageRequest, tally_emotions},
  store::JournalStore,
  user::{NewUser, Session, User, UserCredentials, UserSummary},
};

use crate::{
  Error, Result,
  encode::now,
  queries::{self, Catalog},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A journal store backed by a single SQLite file.
///
/// Clones share one connection thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
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

  /// Run `f` on the connection thread.
  async fn run<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&mut rusqlite::Connection) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self.conn.call(move |conn| Ok(f(conn))).await?
  }
}

// ─── JournalStore impl ───────────────────────────────────────────────────────

impl JournalStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      id:           Uuid::new_v4(),
      email:        input.email.trim().to_owned(),
      display_name: input.display_name,
      is_admin:     input.is_admin,
      created_at:   now(),
    };
    let stored = user.clone();
    let password_hash = input.password_hash;

    self
      .run(move |conn| queries::insert_user(conn, &stored, &password_hash))
      .await?;

    tracing::debug!(user_id = %user.id, "created user");
    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    self.run(move |conn| queries::user_by_id(conn, id)).await
  }

  async fn find_credentials(&self, email: &str) -> Result<Option<UserCredentials>> {
    let email = email.trim().to_owned();
    self
      .run(move |conn| queries::credentials_by_email(conn, &email))
      .await
  }

  async fn update_display_name(&self, id: Uuid, display_name: String) -> Result<Option<User>> {
    self
      .run(move |conn| queries::set_display_name(conn, id, &display_name))
      .await
  }

  async fn delete_user(&self, id: Uuid) -> Result<bool> {
    let removed = self.run(move |conn| queries::remove_user(conn, id)).await?;
    if removed {
      tracing::debug!(user_id = %id, "deleted user and owned entries");
    }
    Ok(removed)
  }

  async fn list_user_summaries(&self) -> Result<Vec<UserSummary>> {
    self.run(|conn| queries::user_summaries(conn)).await
  }

  async fn user_summary(&self, id: Uuid) -> Result<Option<UserSummary>> {
    self.run(move |conn| queries::user_summary(conn, id)).await
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn create_session(&self, session: Session) -> Result<()> {
    self
      .run(move |conn| queries::insert_session(conn, &session))
      .await
  }

  async fn find_session(&self, token_hash: &str) -> Result<Option<Session>> {
    let token_hash = token_hash.to_owned();
    self
      .run(move |conn| queries::session_by_hash(conn, &token_hash))
      .await
  }

  async fn extend_session(&self, token_hash: &str, expires_at: DateTime<Utc>) -> Result<()> {
    let token_hash = token_hash.to_owned();
    self
      .run(move |conn| queries::set_session_expiry(conn, &token_hash, expires_at))
      .await
  }

  async fn delete_session(&self, token_hash: &str) -> Result<()> {
    let token_hash = token_hash.to_owned();
    self
      .run(move |conn| queries::remove_session(conn, &token_hash))
      .await
  }

  async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64> {
    self.run(move |conn| queries::purge_sessions(conn, now)).await
  }

  // ── Catalogs ──────────────────────────────────────────────────────────────

  async fn seed_entry_types(&self, names: &[&str]) -> Result<u64> {
    let names: Vec<String> = names.iter().map(|n| (*n).to_owned()).collect();
    self
      .run(move |conn| queries::seed_catalog(conn, Catalog::EntryTypes, &names))
      .await
  }

  async fn seed_emotions(&self, names: &[&str]) -> Result<u64> {
    let names: Vec<String> = names.iter().map(|n| (*n).to_owned()).collect();
    self
      .run(move |conn| queries::seed_catalog(conn, Catalog::Emotions, &names))
      .await
  }

  async fn list_entry_types(&self) -> Result<Vec<EntryType>> {
    self.run(|conn| queries::entry_types(conn)).await
  }

  async fn list_emotions(&self) -> Result<Vec<Emotion>> {
    self.run(|conn| queries::emotions(conn)).await
  }

  async fn delete_entry_type(&self, id: i64) -> Result<()> {
    self.run(move |conn| queries::remove_entry_type(conn, id)).await
  }

  async fn delete_emotion(&self, id: i64) -> Result<()> {
    self.run(move |conn| queries::remove_emotion(conn, id)).await
  }

  // ── Entries ───────────────────────────────────────────────────────────────

  async fn create_entry(&self, caller: Caller, input: EntryInput) -> Result<Entry> {
    self
      .run(move |conn| queries::create_entry(conn, caller, input))
      .await
  }

  async fn get_entry(&self, caller: Caller, id: i64) -> Result<Entry> {
    self
      .run(move |conn| queries::get_entry(conn, caller, id))
      .await
  }

  async fn update_entry(&self, caller: Caller, id: i64, input: EntryInput) -> Result<Entry> {
    self
      .run(move |conn| queries::update_entry(conn, caller, id, input))
      .await
  }

  async fn delete_entry(&self, caller: Caller, id: i64) -> Result<()> {
    self
      .run(move |conn| queries::delete_entry(conn, caller, id))
      .await
  }

  // ── Queries ───────────────────────────────────────────────────────────────

  async fn list_entries(&self, owner_id: Uuid, page: PageRequest) -> Result<Page<Entry>> {
    let (entries, total) = self
      .run(move |conn| queries::page_of_entries(conn, owner_id, page))
      .await?;
    Ok(Page::new(entries, page, total))
  }

  async fn count_entries(&self, owner_id: Uuid) -> Result<u64> {
    self
      .run(move |conn| queries::count_entries(conn, owner_id))
      .await
  }

  async fn emotion_stats(&self, owner_id: Uuid) -> Result<Vec<EmotionCount>> {
    let names = self
      .run(move |conn| queries::owner_emotion_names(conn, owner_id))
      .await?;
    Ok(tally_emotions(names))
  }

  async fn admin_statistics(&self) -> Result<AdminStatistics> {
    self
      .run(|conn| {
        Ok(AdminStatistics {
          total_users:           queries::count_users(conn)?,
          total_entries:         queries::count_all_entries(conn)?,
          most_used_entry_types: queries::top_entry_types(conn)?,
        })
      })
      .await
  }
}

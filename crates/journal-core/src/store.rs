//! The `JournalStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `journal-store-sqlite`).
//! Higher layers (`journal-api`, `journal-server`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  access::Caller,
  catalog::{Emotion, EntryType},
  entry::{Entry, EntryInput},
  error::DomainError,
  query::{AdminStatistics, EmotionCount, Page, PageRequest},
  user::{NewUser, Session, User, UserCredentials, UserSummary},
};

/// Abstraction over a journal storage backend.
///
/// Entry mutations are each one transaction. Ownership and validation
/// failures are reported as domain errors reachable through
/// [`DomainError::domain`].
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait JournalStore: Send + Sync {
  type Error: std::error::Error + DomainError + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new account. Fails with `Conflict` if the email is taken
  /// (case-insensitively).
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Look up an account and its password hash by email.
  fn find_credentials<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<UserCredentials>, Self::Error>> + Send + 'a;

  /// Returns the updated user, or `None` if the account does not exist.
  fn update_display_name(
    &self,
    id: Uuid,
    display_name: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Remove an account together with its entries, associations and
  /// sessions. Returns `false` if nothing was deleted.
  fn delete_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// All accounts with entry counts and last entry time, ordered by display
  /// name.
  fn list_user_summaries(
    &self,
  ) -> impl Future<Output = Result<Vec<UserSummary>, Self::Error>> + Send + '_;

  /// One account with its entry count; `last_entry_at` is left empty.
  fn user_summary(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<UserSummary>, Self::Error>> + Send + '_;

  // ── Sessions ──────────────────────────────────────────────────────────

  fn create_session(
    &self,
    session: Session,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Fetch a session by token digest, expired or not.
  fn find_session<'a>(
    &'a self,
    token_hash: &'a str,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + 'a;

  fn extend_session<'a>(
    &'a self,
    token_hash: &'a str,
    expires_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn delete_session<'a>(
    &'a self,
    token_hash: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Drop every session that expired at or before `now`; returns how many.
  fn purge_expired_sessions(
    &self,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Catalogs ──────────────────────────────────────────────────────────

  /// Insert each name not already present, in the given order. Returns the
  /// number of rows inserted.
  fn seed_entry_types<'a>(
    &'a self,
    names: &'a [&'a str],
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  /// Same as [`Self::seed_entry_types`], for emotions.
  fn seed_emotions<'a>(
    &'a self,
    names: &'a [&'a str],
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  /// All entry types, alphabetically.
  fn list_entry_types(
    &self,
  ) -> impl Future<Output = Result<Vec<EntryType>, Self::Error>> + Send + '_;

  /// All emotions, alphabetically.
  fn list_emotions(
    &self,
  ) -> impl Future<Output = Result<Vec<Emotion>, Self::Error>> + Send + '_;

  /// Fails with `Conflict` while any entry still references the type.
  fn delete_entry_type(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Removes the emotion and every association to it; entries survive.
  fn delete_emotion(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Entries ───────────────────────────────────────────────────────────

  /// Validate and persist a new entry owned by `caller`.
  fn create_entry(
    &self,
    caller: Caller,
    input: EntryInput,
  ) -> impl Future<Output = Result<Entry, Self::Error>> + Send + '_;

  /// Owner-only read.
  fn get_entry(
    &self,
    caller: Caller,
    id: i64,
  ) -> impl Future<Output = Result<Entry, Self::Error>> + Send + '_;

  /// Owner-only full replacement of fields and emotion set.
  fn update_entry(
    &self,
    caller: Caller,
    id: i64,
    input: EntryInput,
  ) -> impl Future<Output = Result<Entry, Self::Error>> + Send + '_;

  /// Owner or admin. Not idempotent: a second call reports `NotFound`.
  fn delete_entry(
    &self,
    caller: Caller,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Queries ───────────────────────────────────────────────────────────

  /// The owner's entries, newest first.
  fn list_entries(
    &self,
    owner_id: Uuid,
    page: PageRequest,
  ) -> impl Future<Output = Result<Page<Entry>, Self::Error>> + Send + '_;

  fn count_entries(
    &self,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Emotion frequencies across the owner's entries, most frequent first.
  fn emotion_stats(
    &self,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<Vec<EmotionCount>, Self::Error>> + Send + '_;

  fn admin_statistics(
    &self,
  ) -> impl Future<Output = Result<AdminStatistics, Self::Error>> + Send + '_;
}

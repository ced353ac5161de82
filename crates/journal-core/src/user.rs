//! Accounts and sessions.
//!
//! A [`User`] is the public view of an account. The password hash only
//! travels inside [`UserCredentials`], which is never serialised.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id:           Uuid,
  pub email:        String,
  pub display_name: String,
  pub is_admin:     bool,
  pub created_at:   DateTime<Utc>,
}

/// Input to [`crate::store::JournalStore::create_user`].
///
/// The password must already be hashed; the store never sees plaintext.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email:         String,
  pub display_name:  String,
  pub password_hash: String,
  pub is_admin:      bool,
}

/// A user together with the stored password hash, for credential checks.
#[derive(Debug, Clone)]
pub struct UserCredentials {
  pub user:          User,
  pub password_hash: String,
}

/// A user row plus derived usage figures, as shown to administrators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
  #[serde(flatten)]
  pub user:          User,
  pub entry_count:   u64,
  /// `None` for the detail view and for users without entries.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub last_entry_at: Option<DateTime<Utc>>,
}

/// A server-side login session.
///
/// Only the digest of the bearer token is stored; the raw token lives in the
/// client's cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
  pub token_hash: String,
  pub user_id:    Uuid,
  pub created_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}

impl Session {
  pub fn is_expired(&self, now: DateTime<Utc>) -> bool { self.expires_at <= now }

  /// Whether a sliding session should be pushed forward: true once less than
  /// half of `ttl` remains.
  pub fn needs_renewal(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
    self.expires_at - now < ttl / 2
  }
}

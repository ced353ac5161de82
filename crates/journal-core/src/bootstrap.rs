//! One-shot startup initialisation of reference data and seed accounts.

use serde::Deserialize;

use crate::{
  catalog::{DEFAULT_EMOTIONS, DEFAULT_ENTRY_TYPES},
  store::JournalStore,
  user::NewUser,
};

/// An account to create on startup if its email is not registered yet.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedAccount {
  pub email:         String,
  pub display_name:  String,
  /// argon2 PHC string, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  #[serde(default)]
  pub admin:         bool,
}

/// What a [`bootstrap`] run inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
  pub entry_types_added: u64,
  pub emotions_added:    u64,
  /// Emails of the accounts created by this run.
  pub accounts_created:  Vec<String>,
}

/// Insert the default catalogs and any missing seed accounts.
///
/// Safe to run on every start: rows that already exist are left alone.
pub async fn bootstrap<S: JournalStore>(
  store: &S,
  accounts: &[SeedAccount],
) -> Result<BootstrapReport, S::Error> {
  let mut report = BootstrapReport {
    entry_types_added: store.seed_entry_types(DEFAULT_ENTRY_TYPES).await?,
    emotions_added: store.seed_emotions(DEFAULT_EMOTIONS).await?,
    ..BootstrapReport::default()
  };

  for account in accounts {
    if store.find_credentials(&account.email).await?.is_some() {
      continue;
    }
    store
      .create_user(NewUser {
        email:         account.email.clone(),
        display_name:  account.display_name.clone(),
        password_hash: account.password_hash.clone(),
        is_admin:      account.admin,
      })
      .await?;
    report.accounts_created.push(account.email.clone());
  }

  Ok(report)
}

//! JSON HTTP API for the journal service.
//!
//! Exposes an axum [`Router`] backed by any [`journal_core::store::JournalStore`].
//! Sessions are cookie based; see [`session`]. TLS, CORS and request tracing
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let state = journal_api::AppState::new(store, SessionConfig::default());
//! let app = journal_api::router(state).layer(TraceLayer::new_for_http());
//! ```

pub mod admin;
pub mod auth;
pub mod catalogs;
pub mod entries;
pub mod error;
pub mod extract;
pub mod password;
pub mod profile;
pub mod session;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use journal_core::store::JournalStore;

pub use error::ApiError;
pub use session::SessionConfig;

/// Shared handler state.
pub struct AppState<S> {
  pub store:    Arc<S>,
  pub sessions: Arc<SessionConfig>,
}

impl<S> AppState<S> {
  pub fn new(store: Arc<S>, sessions: SessionConfig) -> Self {
    Self { store, sessions: Arc::new(sessions) }
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), sessions: self.sessions.clone() }
  }
}

/// Build the full router: `/auth/*` and `/api/*`.
///
/// The returned `Router<()>` can be merged or nested into any parent router
/// regardless of its own state type.
pub fn router<S>(state: AppState<S>) -> Router<()>
where
  S: JournalStore + 'static,
{
  Router::new()
    // Auth
    .route("/auth/register", post(auth::register::<S>))
    .route("/auth/login", post(auth::login::<S>))
    .route("/auth/logout", post(auth::logout::<S>))
    .route("/auth/me", get(auth::me))
    // Entries
    .route("/api/entries", get(entries::list::<S>).post(entries::create::<S>))
    .route("/api/entries/count", get(entries::count::<S>))
    .route(
      "/api/entries/{id}",
      get(entries::get_one::<S>)
        .put(entries::update::<S>)
        .delete(entries::delete_one::<S>),
    )
    // Catalogs
    .route("/api/entrytypes", get(catalogs::entry_types::<S>))
    .route("/api/emotions", get(catalogs::emotions::<S>))
    .route("/api/emotions/stats", get(catalogs::emotion_stats::<S>))
    // Profile
    .route(
      "/api/user/profile",
      get(profile::get_profile::<S>)
        .put(profile::update_profile::<S>)
        .delete(profile::delete_profile::<S>),
    )
    // Admin
    .route("/api/admin/users", get(admin::list_users::<S>))
    .route(
      "/api/admin/users/{id}",
      get(admin::get_user::<S>).delete(admin::delete_user::<S>),
    )
    .route("/api/admin/statistics", get(admin::statistics::<S>))
    .with_state(state)
}

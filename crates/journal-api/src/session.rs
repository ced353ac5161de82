//! Cookie sessions and the [`CurrentUser`] / [`AdminUser`] extractors.
//!
//! The cookie carries a random bearer token; the store only ever sees its
//! SHA-256 digest.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use journal_core::{
  Error as CoreError,
  access::Caller,
  store::JournalStore,
  user::{Session, User},
};
use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

pub const DEFAULT_COOKIE_NAME: &str = "journal_session";

/// How session cookies are issued and how long sessions live.
#[derive(Debug, Clone)]
pub struct SessionConfig {
  pub cookie_name: String,
  /// Sliding lifetime; renewed once less than half remains.
  pub ttl:         Duration,
  /// Set the `Secure` attribute (requires HTTPS in browsers).
  pub secure:      bool,
}

impl Default for SessionConfig {
  fn default() -> Self {
    Self {
      cookie_name: DEFAULT_COOKIE_NAME.to_owned(),
      ttl:         Duration::hours(8),
      secure:      false,
    }
  }
}

impl SessionConfig {
  /// The cookie handed to the client after a successful sign-in.
  ///
  /// No `Max-Age`: the browser keeps it for its own session and the server
  /// decides when it stops working.
  pub fn cookie(&self, token: String) -> Cookie<'static> {
    Cookie::build((self.cookie_name.clone(), token))
      .path("/")
      .http_only(true)
      .same_site(SameSite::Lax)
      .secure(self.secure)
      .build()
  }

  /// A cookie that matches [`Self::cookie`] for removal.
  pub fn removal(&self) -> Cookie<'static> {
    Cookie::build((self.cookie_name.clone(), "")).path("/").build()
  }
}

// ─── Tokens ──────────────────────────────────────────────────────────────────

/// 256 random bits, URL-safe base64.
pub fn new_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  URL_SAFE_NO_PAD.encode(bytes)
}

/// Lowercase hex SHA-256 of the token; the session's primary key.
pub fn token_digest(token: &str) -> String {
  hex::encode(Sha256::digest(token.as_bytes()))
}

/// Persist a fresh session for `user_id` and add its cookie to `jar`.
pub async fn start_session<S: JournalStore>(
  state: &AppState<S>,
  jar: CookieJar,
  user_id: Uuid,
) -> Result<CookieJar, ApiError> {
  let token = new_token();
  let now = Utc::now();
  state
    .store
    .create_session(Session {
      token_hash: token_digest(&token),
      user_id,
      created_at: now,
      expires_at: now + state.sessions.ttl,
    })
    .await
    .map_err(ApiError::store)?;
  Ok(jar.add(state.sessions.cookie(token)))
}

/// Forget the session named by the request's cookie (if any) and clear the
/// cookie.
pub async fn end_session<S: JournalStore>(
  state: &AppState<S>,
  jar: CookieJar,
) -> Result<CookieJar, ApiError> {
  if let Some(cookie) = jar.get(&state.sessions.cookie_name) {
    let digest = token_digest(cookie.value());
    state
      .store
      .delete_session(&digest)
      .await
      .map_err(ApiError::store)?;
  }
  Ok(jar.remove(state.sessions.removal()))
}

// ─── Extractors ──────────────────────────────────────────────────────────────

/// The signed-in user behind the request's session cookie.
#[derive(Debug, Clone)]
pub struct CurrentUser {
  pub user: User,
}

impl CurrentUser {
  pub fn caller(&self) -> Caller { Caller::from(&self.user) }

  pub fn id(&self) -> Uuid { self.user.id }
}

/// Resolve a raw session token to its user, renewing the session when it is
/// past half its lifetime.
pub async fn authenticate<S: JournalStore>(
  state: &AppState<S>,
  token: &str,
) -> Result<CurrentUser, ApiError> {
  let digest = token_digest(token);
  let session = state
    .store
    .find_session(&digest)
    .await
    .map_err(ApiError::store)?
    .ok_or(CoreError::Unauthorized)?;

  let now = Utc::now();
  if session.is_expired(now) {
    return Err(CoreError::Unauthorized.into());
  }

  let user = state
    .store
    .get_user(session.user_id)
    .await
    .map_err(ApiError::store)?
    .ok_or(CoreError::Unauthorized)?;

  if session.needs_renewal(now, state.sessions.ttl) {
    state
      .store
      .extend_session(&digest, now + state.sessions.ttl)
      .await
      .map_err(ApiError::store)?;
    tracing::debug!(user_id = %user.id, "renewed session");
  }

  Ok(CurrentUser { user })
}

impl<S> FromRequestParts<AppState<S>> for CurrentUser
where
  S: JournalStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let jar = CookieJar::from_headers(&parts.headers);
    let token = jar
      .get(&state.sessions.cookie_name)
      .map(|c| c.value().to_owned())
      .ok_or(CoreError::Unauthorized)?;
    authenticate(state, &token).await
  }
}

/// A [`CurrentUser`] that is also an administrator; 403 otherwise.
#[derive(Debug, Clone)]
pub struct AdminUser(pub CurrentUser);

impl<S> FromRequestParts<AppState<S>> for AdminUser
where
  S: JournalStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let current = CurrentUser::from_request_parts(parts, state).await?;
    current.caller().require_admin()?;
    Ok(AdminUser(current))
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::http::{Request, StatusCode, header};
  use journal_core::user::NewUser;
  use journal_store_sqlite::SqliteStore;

  use super::*;

  async fn make_state(is_admin: bool) -> (AppState<SqliteStore>, User) {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let user = store
      .create_user(NewUser {
        email:         "user@example.com".into(),
        display_name:  "User".into(),
        password_hash: "$argon2id$stub".into(),
        is_admin,
      })
      .await
      .unwrap();
    (AppState::new(Arc::new(store), SessionConfig::default()), user)
  }

  async fn insert_session(
    state: &AppState<SqliteStore>,
    user_id: Uuid,
    expires_in: Duration,
  ) -> String {
    let token = new_token();
    let now = Utc::now();
    state
      .store
      .create_session(Session {
        token_hash: token_digest(&token),
        user_id,
        created_at: now,
        expires_at: now + expires_in,
      })
      .await
      .unwrap();
    token
  }

  fn with_cookie(token: &str) -> Request<axum::body::Body> {
    Request::builder()
      .header(header::COOKIE, format!("{DEFAULT_COOKIE_NAME}={token}"))
      .body(axum::body::Body::empty())
      .unwrap()
  }

  async fn extract(
    req: Request<axum::body::Body>,
    state: &AppState<SqliteStore>,
  ) -> Result<CurrentUser, ApiError> {
    let (mut parts, _) = req.into_parts();
    CurrentUser::from_request_parts(&mut parts, state).await
  }

  #[test]
  fn tokens_are_unique_and_digests_stable() {
    let a = new_token();
    let b = new_token();
    assert_ne!(a, b);
    assert_eq!(a.len(), 43);
    assert_eq!(token_digest(&a), token_digest(&a));
    assert_eq!(token_digest(&a).len(), 64);
  }

  #[test]
  fn cookie_attributes() {
    let cookie = SessionConfig::default().cookie("t".into());
    assert_eq!(cookie.name(), DEFAULT_COOKIE_NAME);
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    assert_eq!(cookie.path(), Some("/"));
  }

  #[tokio::test]
  async fn valid_session() {
    let (state, user) = make_state(false).await;
    let token = insert_session(&state, user.id, Duration::hours(8)).await;
    let current = extract(with_cookie(&token), &state).await.unwrap();
    assert_eq!(current.user, user);
  }

  #[tokio::test]
  async fn missing_cookie() {
    let (state, _) = make_state(false).await;
    let req = Request::builder().body(axum::body::Body::empty()).unwrap();
    let err = extract(req, &state).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn unknown_token() {
    let (state, _) = make_state(false).await;
    let err = extract(with_cookie("forged"), &state).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn expired_session() {
    let (state, user) = make_state(false).await;
    let token = insert_session(&state, user.id, Duration::seconds(-1)).await;
    let err = extract(with_cookie(&token), &state).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn old_session_is_renewed() {
    let (state, user) = make_state(false).await;
    let token = insert_session(&state, user.id, Duration::hours(1)).await;

    extract(with_cookie(&token), &state).await.unwrap();

    let session = state
      .store
      .find_session(&token_digest(&token))
      .await
      .unwrap()
      .unwrap();
    assert!(session.expires_at > Utc::now() + Duration::hours(7));
  }

  #[tokio::test]
  async fn admin_extractor_requires_admin() {
    let (state, user) = make_state(false).await;
    let token = insert_session(&state, user.id, Duration::hours(8)).await;
    let (mut parts, _) = with_cookie(&token).into_parts();
    let err = AdminUser::from_request_parts(&mut parts, &state)
      .await
      .unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);

    let (state, admin) = make_state(true).await;
    let token = insert_session(&state, admin.id, Duration::hours(8)).await;
    let (mut parts, _) = with_cookie(&token).into_parts();
    let AdminUser(current) = AdminUser::from_request_parts(&mut parts, &state)
      .await
      .unwrap();
    assert!(current.user.is_admin);
  }
}

//! Handlers for `/auth` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/register` | 201, sets the session cookie |
//! | `POST` | `/auth/login`    | 401 on unknown email or wrong password |
//! | `POST` | `/auth/logout`   | 204, clears the cookie |
//! | `GET`  | `/auth/me`       | the signed-in user |

use axum::{
  Json,
  extract::State,
  http::{StatusCode, header},
  response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use journal_core::{
  Error as CoreError,
  de::null_as_default,
  store::JournalStore,
  user::{NewUser, User},
};
use serde::Deserialize;

use crate::{
  AppState,
  error::ApiError,
  extract::ApiJson,
  password::{hash_password, policy_violations, verify_password},
  session::{CurrentUser, end_session, start_session},
};

// ─── Register ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterBody {
  #[serde(deserialize_with = "null_as_default")]
  pub email:        String,
  #[serde(deserialize_with = "null_as_default")]
  pub password:     String,
  #[serde(deserialize_with = "null_as_default")]
  pub display_name: String,
}

fn registration_problems(body: &RegisterBody) -> Vec<String> {
  let mut problems = Vec::new();
  let email = body.email.trim();
  if email.is_empty() {
    problems.push("Email is required.".to_owned());
  } else if !email.contains('@') {
    problems.push(format!("Email '{email}' is invalid."));
  }
  if body.display_name.trim().is_empty() {
    problems.push("Display name is required.".to_owned());
  }
  problems.extend(policy_violations(&body.password).into_iter().map(str::to_owned));
  problems
}

/// `POST /auth/register`, body: `{"email","password","displayName"}`
pub async fn register<S>(
  State(state): State<AppState<S>>,
  jar: CookieJar,
  ApiJson(body): ApiJson<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: JournalStore + 'static,
{
  let email = body.email.trim().to_owned();
  if state
    .store
    .find_credentials(&email)
    .await
    .map_err(ApiError::store)?
    .is_some()
  {
    return Err(CoreError::Conflict("A user with this email already exists.".to_owned()).into());
  }

  let problems = registration_problems(&body);
  if !problems.is_empty() {
    return Err(
      CoreError::Validation(format!("Registration failed: {}", problems.join(", "))).into(),
    );
  }

  let password_hash = hash_password(body.password).await?;
  let user = state
    .store
    .create_user(NewUser {
      email,
      display_name: body.display_name.trim().to_owned(),
      password_hash,
      is_admin: false,
    })
    .await
    .map_err(ApiError::store)?;

  let jar = start_session(&state, jar, user.id).await?;
  tracing::info!(user_id = %user.id, "registered");
  Ok((StatusCode::CREATED, [(header::LOCATION, "/auth/me")], jar, Json(user)))
}

// ─── Login / logout ───────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginBody {
  #[serde(deserialize_with = "null_as_default")]
  pub email:    String,
  #[serde(deserialize_with = "null_as_default")]
  pub password: String,
}

/// `POST /auth/login`, body: `{"email","password"}`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  jar: CookieJar,
  ApiJson(body): ApiJson<LoginBody>,
) -> Result<(CookieJar, Json<User>), ApiError>
where
  S: JournalStore + 'static,
{
  let Some(credentials) = state
    .store
    .find_credentials(body.email.trim())
    .await
    .map_err(ApiError::store)?
  else {
    return Err(CoreError::Unauthorized.into());
  };

  if !verify_password(body.password, credentials.password_hash).await? {
    tracing::info!(user_id = %credentials.user.id, "rejected login");
    return Err(CoreError::Unauthorized.into());
  }

  let purged = state
    .store
    .purge_expired_sessions(Utc::now())
    .await
    .map_err(ApiError::store)?;
  if purged > 0 {
    tracing::debug!(purged, "purged expired sessions");
  }

  let user = credentials.user;
  let jar = start_session(&state, jar, user.id).await?;
  tracing::info!(user_id = %user.id, "signed in");
  Ok((jar, Json(user)))
}

/// `POST /auth/logout`
///
/// Succeeds with or without a live session.
pub async fn logout<S>(
  State(state): State<AppState<S>>,
  jar: CookieJar,
) -> Result<(StatusCode, CookieJar), ApiError>
where
  S: JournalStore + 'static,
{
  let jar = end_session(&state, jar).await?;
  Ok((StatusCode::NO_CONTENT, jar))
}

/// `GET /auth/me`
pub async fn me(current: CurrentUser) -> Json<User> { Json(current.user) }

//! Handlers for `/api/user/profile`: the caller's own account.

use axum::{Json, extract::State, http::StatusCode};
use axum_extra::extract::cookie::CookieJar;
use journal_core::{
  Error as CoreError,
  de::null_as_default,
  store::JournalStore,
  user::User,
};
use serde::Deserialize;

use crate::{
  AppState,
  error::ApiError,
  extract::ApiJson,
  session::{CurrentUser, end_session},
};

fn user_not_found() -> ApiError { CoreError::NotFound("user".to_owned()).into() }

/// `GET /api/user/profile`
pub async fn get_profile<S>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
) -> Result<Json<User>, ApiError>
where
  S: JournalStore + 'static,
{
  let user = state
    .store
    .get_user(current.id())
    .await
    .map_err(ApiError::store)?
    .ok_or_else(user_not_found)?;
  Ok(Json(user))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileBody {
  #[serde(deserialize_with = "null_as_default")]
  pub display_name: String,
}

/// `PUT /api/user/profile`, body: `{"displayName"}`
pub async fn update_profile<S>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
  ApiJson(body): ApiJson<ProfileBody>,
) -> Result<Json<User>, ApiError>
where
  S: JournalStore + 'static,
{
  let display_name = body.display_name.trim();
  if display_name.is_empty() {
    return Err(CoreError::Validation("Display name cannot be empty".to_owned()).into());
  }

  let user = state
    .store
    .update_display_name(current.id(), display_name.to_owned())
    .await
    .map_err(ApiError::store)?
    .ok_or_else(user_not_found)?;
  Ok(Json(user))
}

/// `DELETE /api/user/profile`
///
/// Removes the account with all of its entries. Its sessions go with it.
pub async fn delete_profile<S>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
  jar: CookieJar,
) -> Result<(StatusCode, CookieJar), ApiError>
where
  S: JournalStore + 'static,
{
  if !state
    .store
    .delete_user(current.id())
    .await
    .map_err(ApiError::store)?
  {
    return Err(user_not_found());
  }
  tracing::info!(user_id = %current.id(), "deleted own account");
  let jar = end_session(&state, jar).await?;
  Ok((StatusCode::NO_CONTENT, jar))
}

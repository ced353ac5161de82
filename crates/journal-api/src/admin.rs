//! Handlers for `/api/admin` endpoints. Every handler takes an
//! [`AdminUser`], so non-admins get 403 before any work is done.

use axum::{
  Json,
  extract::{Path, State},
};
use journal_core::{
  Error as CoreError,
  query::AdminStatistics,
  store::JournalStore,
  user::UserSummary,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError, session::AdminUser};

fn user_not_found() -> ApiError { CoreError::NotFound("user".to_owned()).into() }

/// User ids are opaque path segments: one that is not even a UUID names no
/// user.
fn parse_user_id(raw: &str) -> Result<Uuid, ApiError> {
  Uuid::parse_str(raw).map_err(|_| user_not_found())
}

/// `GET /api/admin/users`
pub async fn list_users<S>(
  State(state): State<AppState<S>>,
  _admin: AdminUser,
) -> Result<Json<Vec<UserSummary>>, ApiError>
where
  S: JournalStore + 'static,
{
  let users = state
    .store
    .list_user_summaries()
    .await
    .map_err(ApiError::store)?;
  Ok(Json(users))
}

/// `GET /api/admin/users/{id}`
pub async fn get_user<S>(
  State(state): State<AppState<S>>,
  _admin: AdminUser,
  Path(id): Path<String>,
) -> Result<Json<UserSummary>, ApiError>
where
  S: JournalStore + 'static,
{
  let id = parse_user_id(&id)?;
  let user = state
    .store
    .user_summary(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(user_not_found)?;
  Ok(Json(user))
}

#[derive(Debug, Serialize)]
pub struct DeletedBody {
  pub message: String,
}

/// `DELETE /api/admin/users/{id}`
pub async fn delete_user<S>(
  State(state): State<AppState<S>>,
  AdminUser(admin): AdminUser,
  Path(id): Path<String>,
) -> Result<Json<DeletedBody>, ApiError>
where
  S: JournalStore + 'static,
{
  let id = parse_user_id(&id)?;
  let target = state
    .store
    .get_user(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(user_not_found)?;

  if target.id == admin.id() {
    return Err(
      CoreError::Validation("Administrators cannot delete their own account".to_owned()).into(),
    );
  }

  if !state.store.delete_user(id).await.map_err(ApiError::store)? {
    return Err(user_not_found());
  }

  tracing::info!(user_id = %id, admin_id = %admin.id(), "admin deleted user");
  Ok(Json(DeletedBody {
    message: format!("User {} deleted successfully", target.display_name),
  }))
}

/// `GET /api/admin/statistics`
pub async fn statistics<S>(
  State(state): State<AppState<S>>,
  _admin: AdminUser,
) -> Result<Json<AdminStatistics>, ApiError>
where
  S: JournalStore + 'static,
{
  let stats = state.store.admin_statistics().await.map_err(ApiError::store)?;
  Ok(Json(stats))
}

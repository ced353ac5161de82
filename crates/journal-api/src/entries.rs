//! Handlers for `/api/entries` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/api/entries` | `?page=1&pageSize=10`, newest first |
//! | `POST`   | `/api/entries` | 201 with `Location` |
//! | `GET`    | `/api/entries/count` | `{"count": n}` |
//! | `GET`    | `/api/entries/{id}` | owner only |
//! | `PUT`    | `/api/entries/{id}` | owner only, full replacement |
//! | `DELETE` | `/api/entries/{id}` | owner or admin |

use axum::{
  Json,
  extract::State,
  http::{StatusCode, header},
  response::IntoResponse,
};
use journal_core::{
  entry::{Entry, EntryInput},
  query::{DEFAULT_PAGE_SIZE, Page, PageRequest},
  store::JournalStore,
};
use serde::{Deserialize, Serialize};

use crate::{
  AppState,
  error::ApiError,
  extract::{ApiJson, ApiPath, ApiQuery},
  session::CurrentUser,
};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub page:      Option<i64>,
  pub page_size: Option<i64>,
}

impl ListParams {
  fn request(&self) -> Result<PageRequest, ApiError> {
    Ok(PageRequest::new(
      self.page.unwrap_or(1),
      self.page_size.unwrap_or(i64::from(DEFAULT_PAGE_SIZE)),
    )?)
  }
}

/// `GET /api/entries[?page=&pageSize=]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
  ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<Page<Entry>>, ApiError>
where
  S: JournalStore + 'static,
{
  let page = state
    .store
    .list_entries(current.id(), params.request()?)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(page))
}

#[derive(Debug, Serialize)]
pub struct CountBody {
  pub count: u64,
}

/// `GET /api/entries/count`
pub async fn count<S>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
) -> Result<Json<CountBody>, ApiError>
where
  S: JournalStore + 'static,
{
  let count = state
    .store
    .count_entries(current.id())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(CountBody { count }))
}

// ─── Single entry ─────────────────────────────────────────────────────────────

/// `GET /api/entries/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
  ApiPath(id): ApiPath<i64>,
) -> Result<Json<Entry>, ApiError>
where
  S: JournalStore + 'static,
{
  let entry = state
    .store
    .get_entry(current.caller(), id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(entry))
}

/// `POST /api/entries`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
  ApiJson(input): ApiJson<EntryInput>,
) -> Result<impl IntoResponse, ApiError>
where
  S: JournalStore + 'static,
{
  let entry = state
    .store
    .create_entry(current.caller(), input)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(entry_id = entry.id, user_id = %current.id(), "created entry");
  let location = format!("/api/entries/{}", entry.id);
  Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(entry)))
}

/// `PUT /api/entries/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
  ApiPath(id): ApiPath<i64>,
  ApiJson(input): ApiJson<EntryInput>,
) -> Result<Json<Entry>, ApiError>
where
  S: JournalStore + 'static,
{
  let entry = state
    .store
    .update_entry(current.caller(), id, input)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(entry_id = id, user_id = %current.id(), "updated entry");
  Ok(Json(entry))
}

/// `DELETE /api/entries/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
  ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, ApiError>
where
  S: JournalStore + 'static,
{
  state
    .store
    .delete_entry(current.caller(), id)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(entry_id = id, user_id = %current.id(), "deleted entry");
  Ok(StatusCode::NO_CONTENT)
}

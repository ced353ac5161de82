//! Handlers for the lookup catalogs and per-user emotion statistics.
//!
//! `/api/entrytypes` is public so sign-up forms can render before a session
//! exists; the emotion endpoints need a session.

use axum::{Json, extract::State};
use journal_core::{
  catalog::{Emotion, EntryType},
  query::EmotionCount,
  store::JournalStore,
};

use crate::{AppState, error::ApiError, session::CurrentUser};

/// `GET /api/entrytypes`
pub async fn entry_types<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<EntryType>>, ApiError>
where
  S: JournalStore + 'static,
{
  let types = state.store.list_entry_types().await.map_err(ApiError::store)?;
  Ok(Json(types))
}

/// `GET /api/emotions`
pub async fn emotions<S>(
  State(state): State<AppState<S>>,
  _current: CurrentUser,
) -> Result<Json<Vec<Emotion>>, ApiError>
where
  S: JournalStore + 'static,
{
  let emotions = state.store.list_emotions().await.map_err(ApiError::store)?;
  Ok(Json(emotions))
}

/// `GET /api/emotions/stats`
pub async fn emotion_stats<S>(
  State(state): State<AppState<S>>,
  current: CurrentUser,
) -> Result<Json<Vec<EmotionCount>>, ApiError>
where
  S: JournalStore + 'static,
{
  let stats = state
    .store
    .emotion_stats(current.id())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(stats))
}

//! Attempt history endpoint

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;

use super::auth::CurrentUser;
use super::songs::load_owned_song;
use crate::db::{attempts, Attempt};
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<u32>,
}

/// GET /api/attempts/:song_id
pub async fn list_attempts(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(song_id): Path<String>,
    Query(params): Query<HistoryParams>,
) -> ApiResult<Json<Vec<Attempt>>> {
    let song = load_owned_song(&state, &current, &song_id).await?;
    let history =
        attempts::list_attempts(&state.db, &current.user.guid, &song.guid, params.limit).await?;

    Ok(Json(history))
}

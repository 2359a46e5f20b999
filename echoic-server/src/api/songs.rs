//! Song library endpoints

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;
use tracing::{info, warn};

use echoic_common::time::now;

use super::auth::CurrentUser;
use super::form::FormData;
use crate::db::songs::{self, NewSong};
use crate::db::{attempts, Song};
use crate::error::{ApiError, ApiResult};
use crate::services::audio_normalizer::{canonical_path, is_canonical};
use crate::services::storage;
use crate::AppState;

/// Default recognition language for songs and evaluations
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Attempts shown alongside a song
const RECENT_ATTEMPTS: u32 = 10;

/// Load a song and check the caller owns it
///
/// Unknown songs are 404; songs owned by someone else are 403.
pub async fn load_owned_song(state: &AppState, user: &CurrentUser, song_id: &str) -> ApiResult<Song> {
    let song = songs::find_song(&state.db, song_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Song not found: {}", song_id)))?;

    if song.user_guid != user.user.guid {
        return Err(ApiError::Forbidden("Access denied".to_string()));
    }

    Ok(song)
}

/// GET /api/songs
pub async fn list_songs(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<Song>>> {
    let songs = songs::list_songs_for_user(&state.db, &current.user.guid).await?;
    Ok(Json(songs))
}

/// POST /api/songs (multipart)
pub async fn create_song(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let mut form = FormData::collect(multipart).await?;

    let title = form
        .text("title")
        .ok_or_else(|| ApiError::BadRequest("Song title is required".to_string()))?;

    let audio_filename = match form.take_file("audio_file") {
        Some(file) => {
            let original = file.filename.unwrap_or_default();
            if !storage::is_allowed_song_file(&original) {
                return Err(ApiError::BadRequest("Invalid audio file format".to_string()));
            }

            let stored_name = storage::song_upload_filename(&current.user.guid, &original, now());
            storage::save_file(&state.uploads_dir, &stored_name, &file.bytes).await?;
            Some(stored_name)
        }
        None => None,
    };

    let song = songs::create_song(
        &state.db,
        &current.user.guid,
        NewSong {
            title,
            artist: form.text("artist"),
            lyrics: form.text("lyrics"),
            audio_filename,
            language: form
                .text("language")
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        },
    )
    .await?;

    info!(song = %song.guid, user = %current.user.guid, title = %song.title, "Song added");

    Ok((StatusCode::CREATED, Json(song)))
}

/// GET /api/songs/:id
pub async fn get_song(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(song_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let song = load_owned_song(&state, &current, &song_id).await?;
    let recent =
        attempts::list_attempts(&state.db, &current.user.guid, &song.guid, Some(RECENT_ATTEMPTS))
            .await?;

    Ok(Json(json!({
        "lyrics_lines": song.lyrics_lines(),
        "song": song,
        "attempts": recent,
    })))
}

/// DELETE /api/songs/:id
///
/// Removes the song's audio, every recording made against it, its attempts
/// and the song itself.
pub async fn delete_song(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(song_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let song = load_owned_song(&state, &current, &song_id).await?;

    if let Some(filename) = &song.audio_filename {
        storage::remove_file_if_exists(&state.uploads_dir.join(filename)).await?;
    }

    let recordings = attempts::recording_filenames_for_song(&state.db, &song.guid).await?;
    for filename in &recordings {
        let path = state.recordings_dir.join(filename);
        let mut paths = vec![path.clone()];
        // Converted copy written next to non-WAV recordings
        if !is_canonical(&path) {
            paths.push(canonical_path(&path));
        }
        for path in paths {
            if let Err(e) = storage::remove_file_if_exists(&path).await {
                warn!(path = %path.display(), error = %e, "Failed to remove recording");
            }
        }
    }

    songs::delete_song(&state.db, &song.guid).await?;
    info!(song = %song.guid, recordings = recordings.len(), "Song deleted");

    Ok(Json(json!({ "success": true })))
}

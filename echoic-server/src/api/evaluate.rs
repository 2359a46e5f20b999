//! Pronunciation evaluation endpoint

use axum::{
    extract::{Multipart, State},
    Extension, Json,
};
use serde::Serialize;
use tracing::info;

use echoic_common::time::now;

use super::auth::CurrentUser;
use super::form::FormData;
use super::songs::DEFAULT_LANGUAGE;
use crate::db::attempts::{self, NewAttempt};
use crate::db::songs;
use crate::error::{ApiError, ApiResult};
use crate::services::storage;
use crate::services::EvaluationRequest;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    pub success: bool,
    pub transcription: String,
    pub score: f64,
    pub feedback: String,
    pub attempt_id: String,
}

/// POST /api/evaluate (multipart)
///
/// Fields: `song_id`, `line_number`, `expected_text`, `language`
/// (default `en-US`) and the `audio` file. Recognition problems are not
/// errors here: they come back as a zero score with explanatory feedback.
pub async fn evaluate(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    multipart: Multipart,
) -> ApiResult<Json<EvaluateResponse>> {
    let mut form = FormData::collect(multipart).await?;

    let song_id = form.text("song_id");
    let line_number = form
        .text("line_number")
        .and_then(|v| v.parse::<i64>().ok());
    let expected_text = form.text("expected_text");

    let (Some(song_id), Some(line_number), Some(expected_text)) =
        (song_id, line_number, expected_text)
    else {
        return Err(ApiError::BadRequest("Missing required fields".to_string()));
    };
    let language = form
        .text("language")
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

    // Foreign songs are reported as missing on this endpoint
    let song = songs::find_song(&state.db, &song_id)
        .await?
        .filter(|song| song.user_guid == current.user.guid)
        .ok_or_else(|| ApiError::NotFound("Song not found".to_string()))?;

    let audio = form
        .take_file("audio")
        .ok_or_else(|| ApiError::BadRequest("No audio file provided".to_string()))?;

    let extension = storage::recording_extension(&audio.bytes, audio.filename.as_deref());
    let filename = storage::recording_filename(
        &current.user.guid,
        &song.guid,
        line_number,
        now(),
        &extension,
    );
    let audio_path = storage::save_file(&state.recordings_dir, &filename, &audio.bytes).await?;

    let result = state
        .pipeline
        .evaluate(&EvaluationRequest {
            audio_path,
            expected_text: expected_text.clone(),
            language,
        })
        .await;

    let attempt = attempts::record_attempt(
        &state.db,
        NewAttempt {
            user_guid: current.user.guid.clone(),
            song_guid: song.guid.clone(),
            line_number,
            expected_text,
            transcription: result.transcription.clone(),
            audio_filename: Some(filename),
            score: result.score,
            feedback: result.feedback.clone(),
        },
    )
    .await?;

    info!(
        attempt = %attempt.guid,
        song = %song.guid,
        line = line_number,
        score = result.score,
        "Attempt recorded"
    );

    Ok(Json(EvaluateResponse {
        success: true,
        transcription: result.transcription,
        score: result.score,
        feedback: result.feedback,
        attempt_id: attempt.guid,
    }))
}

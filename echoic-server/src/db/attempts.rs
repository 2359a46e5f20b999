//! Attempt history
//!
//! Attempts are append-only; history is read most recent first.

use anyhow::Result;
use sqlx::SqlitePool;
use uuid::Uuid;

use echoic_common::time::{now, to_db_timestamp};

use super::Attempt;

const ATTEMPT_COLUMNS: &str = "guid, user_guid, song_guid, line_number, expected_text, \
    transcription, audio_filename, score, feedback, created_at";

/// Values recorded for one evaluation
#[derive(Debug, Clone)]
pub struct NewAttempt {
    pub user_guid: String,
    pub song_guid: String,
    pub line_number: i64,
    pub expected_text: String,
    pub transcription: String,
    pub audio_filename: Option<String>,
    pub score: f64,
    pub feedback: String,
}

pub async fn record_attempt(pool: &SqlitePool, new_attempt: NewAttempt) -> Result<Attempt> {
    let attempt = Attempt {
        guid: Uuid::new_v4().to_string(),
        user_guid: new_attempt.user_guid,
        song_guid: new_attempt.song_guid,
        line_number: new_attempt.line_number,
        expected_text: new_attempt.expected_text,
        transcription: new_attempt.transcription,
        audio_filename: new_attempt.audio_filename,
        score: new_attempt.score,
        feedback: new_attempt.feedback,
        created_at: to_db_timestamp(now()),
    };

    sqlx::query(
        r#"
        INSERT INTO attempts (
            guid, user_guid, song_guid, line_number, expected_text,
            transcription, audio_filename, score, feedback, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&attempt.guid)
    .bind(&attempt.user_guid)
    .bind(&attempt.song_guid)
    .bind(attempt.line_number)
    .bind(&attempt.expected_text)
    .bind(&attempt.transcription)
    .bind(&attempt.audio_filename)
    .bind(attempt.score)
    .bind(&attempt.feedback)
    .bind(&attempt.created_at)
    .execute(pool)
    .await?;

    Ok(attempt)
}

/// A user's attempts on a song, newest first, optionally capped
pub async fn list_attempts(
    pool: &SqlitePool,
    user_guid: &str,
    song_guid: &str,
    limit: Option<u32>,
) -> Result<Vec<Attempt>> {
    // SQLite treats a negative LIMIT as unbounded
    let limit = limit.map(i64::from).unwrap_or(-1);

    let attempts = sqlx::query_as::<_, Attempt>(&format!(
        r#"
        SELECT {}
        FROM attempts
        WHERE user_guid = ? AND song_guid = ?
        ORDER BY created_at DESC, rowid DESC
        LIMIT ?
        "#,
        ATTEMPT_COLUMNS
    ))
    .bind(user_guid)
    .bind(song_guid)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(attempts)
}

/// Recording filenames of every attempt on a song
pub async fn recording_filenames_for_song(pool: &SqlitePool, song_guid: &str) -> Result<Vec<String>> {
    let names: Vec<Option<String>> =
        sqlx::query_scalar("SELECT audio_filename FROM attempts WHERE song_guid = ?")
            .bind(song_guid)
            .fetch_all(pool)
            .await?;

    Ok(names.into_iter().flatten().collect())
}

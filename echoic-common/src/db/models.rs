//! Database models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub guid: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Song {
    pub guid: String,
    pub title: String,
    pub artist: Option<String>,
    pub lyrics: Option<String>,
    pub audio_filename: Option<String>,
    pub language: String,
    pub user_guid: String,
    pub uploaded_at: String,
}

impl Song {
    /// Non-blank lyric lines, trimmed
    pub fn lyrics_lines(&self) -> Vec<String> {
        self.lyrics
            .as_deref()
            .unwrap_or_default()
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// One persisted pronunciation evaluation
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Attempt {
    pub guid: String,
    pub user_guid: String,
    pub song_guid: String,
    pub line_number: i64,
    pub expected_text: String,
    pub transcription: String,
    pub audio_filename: Option<String>,
    pub score: f64,
    pub feedback: String,
    pub created_at: String,
}

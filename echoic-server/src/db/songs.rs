//! Song library per user

use anyhow::Result;
use sqlx::SqlitePool;
use uuid::Uuid;

use echoic_common::time::{now, to_db_timestamp};

use super::Song;

const SONG_COLUMNS: &str =
    "guid, title, artist, lyrics, audio_filename, language, user_guid, uploaded_at";

/// Fields supplied when adding a song
#[derive(Debug, Clone, Default)]
pub struct NewSong {
    pub title: String,
    pub artist: Option<String>,
    pub lyrics: Option<String>,
    pub audio_filename: Option<String>,
    pub language: String,
}

pub async fn create_song(pool: &SqlitePool, user_guid: &str, new_song: NewSong) -> Result<Song> {
    let song = Song {
        guid: Uuid::new_v4().to_string(),
        title: new_song.title,
        artist: new_song.artist,
        lyrics: new_song.lyrics,
        audio_filename: new_song.audio_filename,
        language: new_song.language,
        user_guid: user_guid.to_string(),
        uploaded_at: to_db_timestamp(now()),
    };

    sqlx::query(
        r#"
        INSERT INTO songs (guid, title, artist, lyrics, audio_filename, language, user_guid, uploaded_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&song.guid)
    .bind(&song.title)
    .bind(&song.artist)
    .bind(&song.lyrics)
    .bind(&song.audio_filename)
    .bind(&song.language)
    .bind(&song.user_guid)
    .bind(&song.uploaded_at)
    .execute(pool)
    .await?;

    Ok(song)
}

pub async fn find_song(pool: &SqlitePool, guid: &str) -> Result<Option<Song>> {
    let song = sqlx::query_as::<_, Song>(&format!("SELECT {} FROM songs WHERE guid = ?", SONG_COLUMNS))
        .bind(guid)
        .fetch_optional(pool)
        .await?;

    Ok(song)
}

/// A user's songs, newest first
pub async fn list_songs_for_user(pool: &SqlitePool, user_guid: &str) -> Result<Vec<Song>> {
    let songs = sqlx::query_as::<_, Song>(&format!(
        "SELECT {} FROM songs WHERE user_guid = ? ORDER BY uploaded_at DESC, rowid DESC",
        SONG_COLUMNS
    ))
    .bind(user_guid)
    .fetch_all(pool)
    .await?;

    Ok(songs)
}

/// Delete a song and its attempts in one transaction
pub async fn delete_song(pool: &SqlitePool, guid: &str) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM attempts WHERE song_guid = ?")
        .bind(guid)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM songs WHERE guid = ?")
        .bind(guid)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

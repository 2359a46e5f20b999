//! Upload and recording file storage
//!
//! Uploaded song audio goes to `<root>/uploads`, evaluation recordings to
//! `<root>/recordings`. Stored names never come verbatim from the client.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::debug;

use echoic_common::time::to_file_timestamp;

/// Song audio extensions accepted on upload
pub const ALLOWED_SONG_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "m4a", "flac"];

/// Fallback extension when a recording's format cannot be determined
pub const DEFAULT_RECORDING_EXTENSION: &str = "wav";

/// Reduce a client-supplied filename to a safe single path component
///
/// Keeps ASCII alphanumerics, `.`, `-` and `_`; whitespace becomes `_`;
/// leading dots and underscores are stripped. May return an empty string.
pub fn secure_filename(name: &str) -> String {
    // Only the last path component counts
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('_')
            } else if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                Some(c)
            } else {
                None
            }
        })
        .collect();

    cleaned.trim_start_matches(['.', '_']).to_string()
}

/// Lowercase extension of a filename, if any
pub fn file_extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_ascii_lowercase())
}

/// True when `name` has one of [`ALLOWED_SONG_EXTENSIONS`]
pub fn is_allowed_song_file(name: &str) -> bool {
    file_extension(name)
        .map(|ext| ALLOWED_SONG_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Stored name for an uploaded song file: `<user>_<timestamp>_<secure name>`
pub fn song_upload_filename(user_guid: &str, original_name: &str, at: DateTime<Utc>) -> String {
    format!(
        "{}_{}_{}",
        user_guid,
        to_file_timestamp(at),
        secure_filename(original_name)
    )
}

/// Pick the extension for a recording
///
/// Content sniffing wins; the uploaded filename's extension is the fallback,
/// then [`DEFAULT_RECORDING_EXTENSION`].
pub fn recording_extension(bytes: &[u8], original_name: Option<&str>) -> String {
    if let Some(kind) = infer::get(bytes) {
        if kind.matcher_type() == infer::MatcherType::Audio
            || kind.matcher_type() == infer::MatcherType::Video
        {
            return kind.extension().to_string();
        }
    }

    original_name
        .map(secure_filename)
        .and_then(|name| file_extension(&name))
        .unwrap_or_else(|| DEFAULT_RECORDING_EXTENSION.to_string())
}

/// Stored name for an evaluation recording:
/// `<user>_<song>_<line>_<YYYYmmdd_HHMMSS_mmm>.<ext>`
pub fn recording_filename(
    user_guid: &str,
    song_guid: &str,
    line_number: i64,
    at: DateTime<Utc>,
    extension: &str,
) -> String {
    format!(
        "{}_{}_{}_{}.{}",
        user_guid,
        song_guid,
        line_number,
        to_file_timestamp(at),
        extension
    )
}

/// Write bytes into `dir/filename`, returning the full path
pub async fn save_file(dir: &Path, filename: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
    let path = dir.join(filename);
    tokio::fs::write(&path, bytes).await?;
    debug!(path = %path.display(), bytes = bytes.len(), "Stored file");
    Ok(path)
}

/// Remove a stored file; a file that is already gone is not an error
pub async fn remove_file_if_exists(path: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!(path = %path.display(), "Removed file");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

//! Canonical audio format conversion
//!
//! Recognition runs on WAV. A recording that already has a `.wav` extension
//! is passed through untouched; anything else is decoded and re-encoded as
//! 16-bit mono PCM next to the original (same stem, `.wav` extension).

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::utils::{decode_audio_file, write_wav_mono_i16};

/// Canonical container extension
pub const CANONICAL_EXTENSION: &str = "wav";

/// Input audio could not be read or converted
#[derive(Debug, Error)]
#[error("Audio conversion failed for {path}: {reason}")]
pub struct AudioConversionError {
    pub path: PathBuf,
    pub reason: String,
}

impl AudioConversionError {
    pub fn new(path: &Path, reason: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

/// True when the path already carries the canonical extension
pub fn is_canonical(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(CANONICAL_EXTENSION))
        .unwrap_or(false)
}

/// Where the converted file for `path` is written
pub fn canonical_path(path: &Path) -> PathBuf {
    path.with_extension(CANONICAL_EXTENSION)
}

/// Ensure the recording is in canonical format, returning the path to use
///
/// Blocking: decodes and writes files. Call from `spawn_blocking` in async code.
pub fn normalize_to_wav(path: &Path) -> Result<PathBuf, AudioConversionError> {
    if is_canonical(path) {
        debug!(path = %path.display(), "Audio already canonical, skipping conversion");
        return Ok(path.to_path_buf());
    }

    let decoded = decode_audio_file(path)
        .map_err(|e| AudioConversionError::new(path, format!("{:#}", e)))?;

    let wav_path = canonical_path(path);
    write_wav_mono_i16(&wav_path, &decoded.samples, decoded.sample_rate)
        .map_err(|e| AudioConversionError::new(path, format!("{:#}", e)))?;

    debug!(
        source = %path.display(),
        target = %wav_path.display(),
        sample_rate = decoded.sample_rate,
        duration_seconds = format!("{:.2}", decoded.duration_seconds),
        "Converted audio to WAV"
    );

    Ok(wav_path)
}

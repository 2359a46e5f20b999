//! Transcription adapter around an external speech recognizer
//!
//! The recognizer is a capability ([`Recognizer`]) so the cloud engine and
//! deterministic test doubles are interchangeable. The adapter prepares the
//! canonical WAV for recognition (mono, 16-bit, at least 8 kHz), calibrates
//! against ambient noise over a fixed leading window, and classifies the
//! engine's answer as transcript, no speech, or failure.

use async_trait::async_trait;
use echoic_common::config::RecognizerSettings;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use super::audio_normalizer::AudioConversionError;
use crate::utils::{read_wav_mono, resample_mono, wav::to_i16};

/// Engines reject audio below this rate; slower recordings are upsampled
pub const MIN_RECOGNITION_SAMPLE_RATE: u32 = 8000;

/// Recognizer settings passed explicitly into the pipeline
#[derive(Debug, Clone)]
pub struct RecognizerConfig {
    pub endpoint: String,
    pub client: String,
    pub api_key: Option<String>,
    pub ambient_window: Duration,
    pub timeout: Option<Duration>,
}

impl RecognizerConfig {
    pub fn from_settings(settings: &RecognizerSettings, api_key: Option<String>) -> Self {
        Self {
            endpoint: settings.endpoint.clone(),
            client: settings.client.clone(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            ambient_window: Duration::from_millis(settings.ambient_window_ms),
            timeout: (settings.timeout_secs > 0).then(|| Duration::from_secs(settings.timeout_secs)),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .map(|key| !key.trim().is_empty())
            .unwrap_or(false)
    }
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self::from_settings(&RecognizerSettings::default(), None)
    }
}

/// Audio handed to the recognizer: mono 16-bit PCM
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionAudio {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

impl RecognitionAudio {
    /// Big-endian 16-bit linear PCM (`audio/l16`)
    pub fn to_l16_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_be_bytes()).collect()
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }
}

/// The recognition service could not be used
#[derive(Debug, Clone, Error)]
pub enum RecognitionError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Recognizer configuration error: {0}")]
    Config(String),
}

/// Speech-to-text capability
///
/// `Ok("")` means the engine answered but heard no intelligible speech;
/// `Err` means the engine could not be reached or answered unusably.
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Engine name for logs
    fn name(&self) -> &str;

    async fn recognize(
        &self,
        audio: &RecognitionAudio,
        language: &str,
    ) -> Result<String, RecognitionError>;
}

/// Result of a successful engine round trip
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptionOutcome {
    Transcribed(String),
    NoSpeech,
}

/// Pipeline-internal failure; degrades to a zero score, never reaches the caller
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    AudioConversion(#[from] AudioConversionError),

    #[error("Recognition unavailable: {0}")]
    RecognitionUnavailable(#[from] RecognitionError),
}

/// Ambient noise measured over the leading window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientCalibration {
    /// Samples consumed by calibration
    pub window_samples: usize,
    /// RMS energy of the window in 16-bit sample units
    pub rms: f64,
}

/// Measure ambient noise over `window` and split it off the recording
///
/// Returns the calibration and the remaining recognizable segment. A
/// recording shorter than the window leaves an empty segment.
pub fn calibrate_ambient_noise(
    samples: &[i16],
    sample_rate: u32,
    window: Duration,
) -> (AmbientCalibration, &[i16]) {
    let window_samples =
        ((sample_rate as f64 * window.as_secs_f64()).round() as usize).min(samples.len());
    let (noise, segment) = samples.split_at(window_samples);

    let rms = if noise.is_empty() {
        0.0
    } else {
        let sum_squares: f64 = noise.iter().map(|&s| (s as f64) * (s as f64)).sum();
        (sum_squares / noise.len() as f64).sqrt()
    };

    (AmbientCalibration { window_samples, rms }, segment)
}

/// Load a canonical WAV and build the recognizable segment
///
/// Blocking: reads the file. An unreadable file is a conversion error.
pub fn prepare_recognition_audio(
    wav_path: &Path,
    ambient_window: Duration,
) -> Result<(RecognitionAudio, AmbientCalibration), AudioConversionError> {
    let wav = read_wav_mono(wav_path)
        .map_err(|e| AudioConversionError::new(wav_path, format!("{:#}", e)))?;

    let (samples, sample_rate) = if wav.sample_rate < MIN_RECOGNITION_SAMPLE_RATE {
        let resampled = resample_mono(&wav.samples, wav.sample_rate, MIN_RECOGNITION_SAMPLE_RATE)
            .map_err(|e| AudioConversionError::new(wav_path, format!("{:#}", e)))?;
        (resampled, MIN_RECOGNITION_SAMPLE_RATE)
    } else {
        (wav.samples, wav.sample_rate)
    };

    let pcm: Vec<i16> = samples.iter().map(|&s| to_i16(s)).collect();
    let (calibration, segment) = calibrate_ambient_noise(&pcm, sample_rate, ambient_window);

    Ok((
        RecognitionAudio {
            samples: segment.to_vec(),
            sample_rate,
        },
        calibration,
    ))
}

/// Wraps a [`Recognizer`] with audio preparation and outcome classification
#[derive(Clone)]
pub struct TranscriptionAdapter {
    recognizer: Arc<dyn Recognizer>,
    ambient_window: Duration,
}

impl TranscriptionAdapter {
    pub fn new(recognizer: Arc<dyn Recognizer>, ambient_window: Duration) -> Self {
        Self {
            recognizer,
            ambient_window,
        }
    }

    pub fn recognizer_name(&self) -> &str {
        self.recognizer.name()
    }

    /// Transcribe a canonical WAV file; single attempt, no retry
    pub async fn transcribe(
        &self,
        wav_path: &Path,
        language: &str,
    ) -> Result<TranscriptionOutcome, PipelineError> {
        let path: PathBuf = wav_path.to_path_buf();
        let window = self.ambient_window;
        let (audio, calibration) =
            tokio::task::spawn_blocking(move || prepare_recognition_audio(&path, window))
                .await
                .map_err(|e| AudioConversionError::new(wav_path, format!("Audio task failed: {}", e)))??;

        debug!(
            path = %wav_path.display(),
            ambient_rms = format!("{:.1}", calibration.rms),
            calibration_samples = calibration.window_samples,
            segment_seconds = format!("{:.2}", audio.duration().as_secs_f64()),
            "Ambient noise calibration complete"
        );

        match self.recognizer.recognize(&audio, language).await {
            Ok(text) if text.trim().is_empty() => Ok(TranscriptionOutcome::NoSpeech),
            Ok(text) => Ok(TranscriptionOutcome::Transcribed(text)),
            Err(e) => {
                warn!(
                    recognizer = self.recognizer.name(),
                    error = %e,
                    "Could not request results from speech recognition service"
                );
                Err(PipelineError::RecognitionUnavailable(e))
            }
        }
    }
}

/// Canned answer for [`FixedRecognizer`]
#[derive(Debug, Clone)]
pub enum FixedResponse {
    Transcript(String),
    Failure(RecognitionError),
}

/// Deterministic recognizer returning a canned answer
///
/// Counts calls so tests can assert there is no retry.
pub struct FixedRecognizer {
    response: FixedResponse,
    calls: AtomicUsize,
}

impl FixedRecognizer {
    pub fn new(response: FixedResponse) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn transcript(text: &str) -> Self {
        Self::new(FixedResponse::Transcript(text.to_string()))
    }

    pub fn no_speech() -> Self {
        Self::transcript("")
    }

    pub fn unavailable(reason: &str) -> Self {
        Self::new(FixedResponse::Failure(RecognitionError::Network(reason.to_string())))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Recognizer for FixedRecognizer {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn recognize(
        &self,
        _audio: &RecognitionAudio,
        _language: &str,
    ) -> Result<String, RecognitionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            FixedResponse::Transcript(text) => Ok(text.clone()),
            FixedResponse::Failure(err) => Err(err.clone()),
        }
    }
}

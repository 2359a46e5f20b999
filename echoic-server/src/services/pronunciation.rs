//! Pronunciation evaluation pipeline
//!
//! recording -> canonical WAV -> transcription -> normalization + scoring
//! -> feedback. Every well-formed request yields an [`EvaluationResult`];
//! conversion and recognition failures degrade to a zero score with a fixed
//! message instead of propagating.

use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::audio_normalizer::{normalize_to_wav, AudioConversionError};
use super::feedback::{generate_feedback, NO_SPEECH_FEEDBACK, PROCESSING_ERROR_FEEDBACK};
use super::similarity::{round_score, similarity_score};
use super::text_normalizer::normalize_text;
use super::transcription::{
    PipelineError, Recognizer, RecognizerConfig, TranscriptionAdapter, TranscriptionOutcome,
};

/// One evaluation: a stored recording and the line it should match
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    pub audio_path: PathBuf,
    pub expected_text: String,
    pub language: String,
}

/// How the evaluation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationOutcome {
    Scored,
    NoSpeech,
    ProcessingError,
}

/// Transcript, score and feedback for one evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub transcription: String,
    /// 0-100, two decimals
    pub score: f64,
    pub feedback: String,
    #[serde(skip)]
    pub outcome: EvaluationOutcome,
}

impl EvaluationResult {
    pub fn processing_error() -> Self {
        Self {
            transcription: String::new(),
            score: 0.0,
            feedback: PROCESSING_ERROR_FEEDBACK.to_string(),
            outcome: EvaluationOutcome::ProcessingError,
        }
    }

    pub fn no_speech() -> Self {
        Self {
            transcription: String::new(),
            score: 0.0,
            feedback: NO_SPEECH_FEEDBACK.to_string(),
            outcome: EvaluationOutcome::NoSpeech,
        }
    }
}

/// Score a transcript against the expected text
///
/// Tiers are chosen on the unrounded score; the stored score is rounded.
pub fn score_transcript(expected_text: &str, transcript: &str) -> EvaluationResult {
    let expected_norm = normalize_text(expected_text);
    let actual_norm = normalize_text(transcript);

    if expected_norm.is_empty() {
        debug!("Expected text is empty after normalization, scoring 0");
    }

    let score = similarity_score(&expected_norm, &actual_norm);
    let feedback = generate_feedback(expected_text, transcript, score);

    EvaluationResult {
        transcription: transcript.to_string(),
        score: round_score(score),
        feedback,
        outcome: EvaluationOutcome::Scored,
    }
}

/// Stateless evaluation pipeline; clone-cheap and shareable across requests
#[derive(Clone)]
pub struct PronunciationPipeline {
    adapter: TranscriptionAdapter,
}

impl PronunciationPipeline {
    pub fn new(recognizer: Arc<dyn Recognizer>, config: &RecognizerConfig) -> Self {
        Self {
            adapter: TranscriptionAdapter::new(recognizer, config.ambient_window),
        }
    }

    pub fn recognizer_name(&self) -> &str {
        self.adapter.recognizer_name()
    }

    pub async fn evaluate(&self, request: &EvaluationRequest) -> EvaluationResult {
        let result = match self.transcribe(request).await {
            Ok(TranscriptionOutcome::Transcribed(transcript)) => {
                score_transcript(&request.expected_text, &transcript)
            }
            Ok(TranscriptionOutcome::NoSpeech) => EvaluationResult::no_speech(),
            Err(e) => {
                warn!(path = %request.audio_path.display(), error = %e, "Evaluation failed");
                EvaluationResult::processing_error()
            }
        };

        info!(
            path = %request.audio_path.display(),
            language = %request.language,
            outcome = ?result.outcome,
            score = result.score,
            "Pronunciation evaluated"
        );

        result
    }

    async fn transcribe(
        &self,
        request: &EvaluationRequest,
    ) -> Result<TranscriptionOutcome, PipelineError> {
        let source = request.audio_path.clone();
        let wav_path = tokio::task::spawn_blocking(move || normalize_to_wav(&source))
            .await
            .map_err(|e| {
                AudioConversionError::new(&request.audio_path, format!("Audio task failed: {}", e))
            })??;

        self.adapter.transcribe(&wav_path, &request.language).await
    }
}

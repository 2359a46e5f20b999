//! Pronunciation scoring services and upload storage helpers

pub mod audio_normalizer;
pub mod feedback;
pub mod google_speech;
pub mod pronunciation;
pub mod similarity;
pub mod storage;
pub mod text_normalizer;
pub mod transcription;

pub use audio_normalizer::{normalize_to_wav, AudioConversionError};
pub use feedback::{generate_feedback, FeedbackTier};
pub use google_speech::GoogleSpeechRecognizer;
pub use pronunciation::{
    score_transcript, EvaluationOutcome, EvaluationRequest, EvaluationResult, PronunciationPipeline,
};
pub use similarity::similarity_score;
pub use text_normalizer::normalize_text;
pub use transcription::{
    FixedRecognizer, PipelineError, RecognitionAudio, RecognitionError, Recognizer,
    RecognizerConfig, TranscriptionAdapter, TranscriptionOutcome,
};

//! Score tiers and feedback text

use serde::Serialize;

use super::text_normalizer::{normalize_text, word_count};

/// Feedback when the audio could not be converted or recognized
pub const PROCESSING_ERROR_FEEDBACK: &str = "Error processing audio. Please try again.";

/// Feedback when recognition succeeded but heard no intelligible speech
pub const NO_SPEECH_FEEDBACK: &str = "Could not understand audio. Please speak clearly and try again.";

/// Score tier, checked from the highest inclusive lower bound down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackTier {
    Excellent,
    Good,
    Fair,
    NeedsPractice,
    Retry,
}

impl FeedbackTier {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            FeedbackTier::Excellent
        } else if score >= 75.0 {
            FeedbackTier::Good
        } else if score >= 60.0 {
            FeedbackTier::Fair
        } else if score >= 40.0 {
            FeedbackTier::NeedsPractice
        } else {
            FeedbackTier::Retry
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            FeedbackTier::Excellent => "Excellent pronunciation! 🎉",
            FeedbackTier::Good => "Good job! Keep practicing. 👍",
            FeedbackTier::Fair => "Not bad, but there's room for improvement. 💪",
            FeedbackTier::NeedsPractice => "Keep trying! Practice makes perfect. 📚",
            FeedbackTier::Retry => "Try again! Listen carefully to the original. 🎧",
        }
    }
}

/// Tier message plus detail lines when the texts differ
///
/// `expected` and `actual` are the raw texts; they are normalized here for
/// the comparison but quoted verbatim in the detail lines.
pub fn generate_feedback(expected: &str, actual: &str, score: f64) -> String {
    let mut lines = vec![FeedbackTier::from_score(score).message().to_string()];

    let expected_norm = normalize_text(expected);
    let actual_norm = normalize_text(actual);

    if expected_norm != actual_norm {
        lines.push(format!("\nExpected: \"{}\"", expected));
        lines.push(format!("You said: \"{}\"", actual));

        let expected_words = word_count(&expected_norm);
        let actual_words = word_count(&actual_norm);
        if expected_words != actual_words {
            lines.push(format!(
                "\nWord count - Expected: {}, Yours: {}",
                expected_words, actual_words
            ));
        }
    }

    lines.join("\n")
}

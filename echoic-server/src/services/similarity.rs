//! Edit-distance similarity between expected and transcribed text
//!
//! Distance is measured in characters (Unicode scalar values), not words.
//! Switching to word granularity would change every stored score.

/// Score two *already normalized* strings on a 0-100 scale
///
/// `(1 - distance / max_len) * 100`, clamped. Either side empty scores 0.
pub fn similarity_score(expected: &str, actual: &str) -> f64 {
    if expected.is_empty() || actual.is_empty() {
        return 0.0;
    }

    let distance = strsim::levenshtein(expected, actual);
    let max_len = expected.chars().count().max(actual.chars().count());

    let similarity = (1.0 - distance as f64 / max_len as f64) * 100.0;
    similarity.clamp(0.0, 100.0)
}

/// Round to two decimals for presentation and storage
pub fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings_score_100() {
        for s in ["a", "hello world", "route_66 café", "the quick brown fox"] {
            assert_eq!(similarity_score(s, s), 100.0);
        }
    }

    #[test]
    fn test_empty_side_scores_zero() {
        assert_eq!(similarity_score("", "hello"), 0.0);
        assert_eq!(similarity_score("hello", ""), 0.0);
        assert_eq!(similarity_score("", ""), 0.0);
    }

    #[test]
    fn test_single_substitution() {
        let score = similarity_score("cat", "bat");
        assert!((score - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(round_score(score), 66.67);
    }

    #[test]
    fn test_character_granularity() {
        // "the quick fox" -> "the quick" deletes " fox": 4 edits over 13 chars
        let score = similarity_score("the quick fox", "the quick");
        assert!((score - (1.0 - 4.0 / 13.0) * 100.0).abs() < 1e-9);
        assert_eq!(round_score(score), 69.23);
    }

    #[test]
    fn test_multibyte_counts_chars_not_bytes() {
        // One substitution over four chars, although "é" is two bytes
        let score = similarity_score("café", "cafe");
        assert_eq!(score, 75.0);
    }

    #[test]
    fn test_symmetric_and_bounded() {
        let pairs = [
            ("hello world", "hello"),
            ("abc", "xyz"),
            ("kitten", "sitting"),
            ("a", "completely different text"),
        ];
        for (a, b) in pairs {
            let ab = similarity_score(a, b);
            let ba = similarity_score(b, a);
            assert_eq!(ab, ba, "asymmetric for {:?}/{:?}", a, b);
            assert!((0.0..=100.0).contains(&ab));
        }
    }

    #[test]
    fn test_completely_different_scores_zero() {
        assert_eq!(similarity_score("abc", "xyz"), 0.0);
    }
}

//! Text normalization applied before comparison
//!
//! Both the expected lyric and the transcript go through [`normalize_text`];
//! normalizing only one side would skew every score.

/// Lowercase, drop punctuation, collapse whitespace, trim
///
/// Word characters are alphanumerics and `_`. Everything that is neither a
/// word character nor whitespace is removed outright, so `don't` becomes
/// `dont` rather than `don t`.
pub fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase();

    let stripped: String = lowered
        .chars()
        .filter(|c| is_word_char(*c) || c.is_whitespace())
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whitespace-split word count of the normalized text
pub fn word_count(normalized: &str) -> usize {
    normalized.split_whitespace().count()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

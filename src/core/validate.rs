//! Message validation and the per-sentence length gate.
//!
//! The script check is a coarse heuristic: any ASCII lowercase letter in
//! the lowercased text rejects the message, including mixed-script input
//! that is mostly Cyrillic. This mirrors the single-language restriction
//! of the bot and is intentionally strict.

use crate::domain::{Rejection, Sentence};

/// Word ceiling per sentence. Above this, SVG-to-PNG conversion is known
/// to be unreliable, so the render/convert path is not attempted at all.
pub const MAX_SENTENCE_WORDS: usize = 20;

/// Check a whole message before segmentation. Pure, no side effects.
pub fn validate(text: &str) -> Result<(), Rejection> {
    if text
        .to_lowercase()
        .chars()
        .any(|c| c.is_ascii_lowercase())
    {
        return Err(Rejection::ForeignScript);
    }

    if text.trim().chars().count() <= 1 {
        return Err(Rejection::TooShort);
    }

    Ok(())
}

/// Length gate: whether a sentence is short enough to render and convert
pub fn within_word_limit(sentence: &Sentence) -> bool {
    sentence.word_count() <= MAX_SENTENCE_WORDS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_latin_text() {
        assert_eq!(validate("hello"), Err(Rejection::ForeignScript));
    }

    #[test]
    fn test_rejects_uppercase_latin() {
        // Lowercasing happens before the check, so capitals count too
        assert_eq!(validate("HELLO"), Err(Rejection::ForeignScript));
    }

    #[test]
    fn test_rejects_mixed_script() {
        assert_eq!(
            validate("Привет from Rust"),
            Err(Rejection::ForeignScript)
        );
    }

    #[test]
    fn test_foreign_script_takes_precedence_over_length() {
        // A single Latin letter trips the script check first
        assert_eq!(validate("a"), Err(Rejection::ForeignScript));
    }

    #[test]
    fn test_rejects_single_character() {
        assert_eq!(validate("."), Err(Rejection::TooShort));
        assert_eq!(validate("Я"), Err(Rejection::TooShort));
    }

    #[test]
    fn test_rejects_whitespace_padding() {
        assert_eq!(validate("  я  "), Err(Rejection::TooShort));
        assert_eq!(validate("   "), Err(Rejection::TooShort));
    }

    #[test]
    fn test_accepts_cyrillic_text() {
        assert!(validate("Привет").is_ok());
        assert!(validate("Мама мыла раму.").is_ok());
    }

    #[test]
    fn test_accepts_digits_and_punctuation() {
        assert!(validate("Ему 25 лет!").is_ok());
    }

    #[test]
    fn test_word_limit() {
        let short = Sentence::new("Мама мыла раму", vec![]);
        assert!(within_word_limit(&short));

        let words = vec!["слово"; MAX_SENTENCE_WORDS + 1].join(" ");
        let long = Sentence::new(words, vec![]);
        assert!(!within_word_limit(&long));
    }

    #[test]
    fn test_word_limit_boundary() {
        let words = vec!["слово"; MAX_SENTENCE_WORDS].join(" ");
        let exactly = Sentence::new(words, vec![]);
        assert!(within_word_limit(&exactly));
    }
}

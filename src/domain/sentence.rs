//! Parsed sentences and their dependency structure.

use serde::{Deserialize, Serialize};

/// One word of a parsed sentence with its dependency attachment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    /// Surface form as it appears in the sentence
    pub text: String,

    /// Universal part-of-speech tag (NOUN, VERB, ...)
    pub upos: String,

    /// 0-based index of the head word; the root points at itself
    pub head: usize,

    /// Dependency relation to the head (nsubj, obj, root, ...)
    pub deprel: String,
}

/// A single sentence produced by the segmenter.
///
/// One message yields an ordered sequence of zero-or-more sentences;
/// order is document order. Lives for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    /// Sentence text, trimmed
    pub text: String,

    /// Words in surface order with head/deprel attachments
    pub words: Vec<Word>,
}

impl Sentence {
    /// Create a sentence from its text and parsed words
    pub fn new(text: impl Into<String>, words: Vec<Word>) -> Self {
        Self {
            text: text.into(),
            words,
        }
    }

    /// Number of whitespace-separated words in the sentence text.
    ///
    /// This counts the raw text, not the tokenized words: the length gate
    /// judges what the user typed, and tokenizers split off punctuation.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Whether this word is the root of the sentence
    pub fn is_root(&self, index: usize) -> bool {
        self.words
            .get(index)
            .map(|w| w.head == index)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, upos: &str, head: usize, deprel: &str) -> Word {
        Word {
            text: text.to_string(),
            upos: upos.to_string(),
            head,
            deprel: deprel.to_string(),
        }
    }

    #[test]
    fn test_word_count_splits_on_whitespace() {
        let s = Sentence::new("Мама  мыла раму", vec![]);
        assert_eq!(s.word_count(), 3);
    }

    #[test]
    fn test_root_detection() {
        let s = Sentence::new(
            "Мама мыла раму",
            vec![
                word("Мама", "NOUN", 1, "nsubj"),
                word("мыла", "VERB", 1, "root"),
                word("раму", "NOUN", 1, "obj"),
            ],
        );
        assert!(!s.is_root(0));
        assert!(s.is_root(1));
        assert!(!s.is_root(2));
    }
}

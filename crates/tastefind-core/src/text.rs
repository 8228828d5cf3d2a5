//! Text normalization shared by the index, the rankers and the relevance cascade.
//!
//! Two kinds of tokenization live here:
//!
//! - [`NormalizationSpec`] describes how the lexical index was built. It is
//!   serialized next to the term vectors so the query side always applies the
//!   exact same steps. A version bump invalidates old indexes.
//! - [`word_tokens`] and [`normalize_phrase`] back the heuristic relevance
//!   checks, which compare against raw document text and never go through the
//!   index.

use serde::{Deserialize, Serialize};

/// Versioned description of how text is turned into index terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationSpec {
    /// Version of the normalization steps (see [`Self::CURRENT_VERSION`])
    pub version: u32,
    /// Lowercase before tokenizing
    pub lowercase: bool,
    /// Collapse whitespace runs into one space
    pub collapse_whitespace: bool,
    /// Largest n-gram emitted (1 = unigrams only)
    pub ngram_max: usize,
}

impl NormalizationSpec {
    /// Version implemented by [`Self::normalize`] and [`Self::terms`].
    pub const CURRENT_VERSION: u32 = 1;

    /// Applies the character-level steps (case folding, whitespace).
    pub fn normalize(&self, text: &str) -> String {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        if self.collapse_whitespace {
            collapse_whitespace(&text)
        } else {
            text
        }
    }

    /// Produces the index terms for `text`: words of two or more
    /// alphanumeric characters, followed by every n-gram up to `ngram_max`.
    pub fn terms(&self, text: &str) -> Vec<String> {
        let normalized = self.normalize(text);
        let words: Vec<&str> = normalized
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() >= 2)
            .collect();

        let mut terms: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        for n in 2..=self.ngram_max.max(1) {
            terms.extend(words.windows(n).map(|window| window.join(" ")));
        }
        terms
    }
}

impl Default for NormalizationSpec {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            lowercase: true,
            collapse_whitespace: true,
            ngram_max: 2,
        }
    }
}

/// Collapses runs of whitespace into single spaces and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercases and collapses whitespace; the form used for phrase matching.
pub fn normalize_phrase(text: &str) -> String {
    collapse_whitespace(&text.to_lowercase())
}

/// Lowercased alphanumeric tokens, splitting on anything else.
///
/// Punctuation never sticks to a word, so "chicken." and "chicken" are the
/// same token.
pub fn word_tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Unique tokens of at least `min_len` characters, in first-seen order.
pub fn significant_tokens(text: &str, min_len: usize) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    word_tokens(text)
        .into_iter()
        .filter(|t| t.chars().count() >= min_len)
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

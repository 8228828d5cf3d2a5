//! HuggingFace tokenizer wrapper with truncation configured.

use crate::error::EmbeddingError;
use std::path::Path;
use tokenizers::tokenizer::{Tokenizer, TruncationDirection, TruncationParams, TruncationStrategy};

/// Tokenizer with a maximum sequence length.
#[derive(Clone)]
pub struct TokenizerHandle {
    tokenizer: Tokenizer,
    max_length: usize,
}

impl TokenizerHandle {
    /// Loads `tokenizer.json` and truncates encodings to `max_length` tokens.
    ///
    /// # Errors
    ///
    /// Returns `EmbeddingError::ModelLoad` if the file cannot be read or parsed.
    pub fn from_file(path: &Path, max_length: usize) -> Result<Self, EmbeddingError> {
        let mut tokenizer = Tokenizer::from_file(path).map_err(|e| {
            EmbeddingError::ModelLoad(format!(
                "Failed to load tokenizer {}: {}",
                path.display(),
                e
            ))
        })?;

        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                stride: 0,
                strategy: TruncationStrategy::LongestFirst,
                direction: TruncationDirection::Right,
            }))
            .map_err(|e| {
                EmbeddingError::ModelLoad(format!("Failed to configure truncation: {}", e))
            })?;

        Ok(Self {
            tokenizer,
            max_length,
        })
    }

    /// Returns the configured maximum length.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Tokenizes text into ids, including special tokens.
    ///
    /// # Errors
    ///
    /// Returns `EmbeddingError::TokenizationFailed` if encoding fails or
    /// produces no tokens.
    pub fn tokenize(&self, text: &str) -> Result<Vec<u32>, EmbeddingError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| EmbeddingError::TokenizationFailed(format!("Encoding failed: {}", e)))?;

        let ids = encoding.get_ids();
        if ids.is_empty() {
            return Err(EmbeddingError::TokenizationFailed(
                "Tokenizer returned no tokens".to_string(),
            ));
        }
        Ok(ids.to_vec())
    }
}

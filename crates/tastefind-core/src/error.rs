//! Error types for tastefind-core.
//!
//! Errors are split along the lines the engine cares about:
//!
//! - [`ConfigError`] - missing or inconsistent artifacts, bad tuning values.
//!   Fatal for the affected category and never retried.
//! - [`EmbeddingError`] - the semantic encoder could not be loaded or run.
//!   The semantic ranker turns these into an empty candidate list.
//! - [`SearchError`] - per-request failures (malformed input, unknown category).
//! - [`EvaluationError`] - failures surfaced by the evaluation engine.
//!
//! "No results" is never an error: empty result lists and zero-valued metrics
//! are ordinary return values.

use crate::corpus::Category;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading artifacts or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required artifact file does not exist
    #[error("Missing {kind} artifact for category '{category}': {}", path.display())]
    MissingArtifact {
        /// Category the artifact belongs to
        category: Category,
        /// Artifact kind ("metadata", "lexical", "embeddings")
        kind: &'static str,
        /// Path that was probed
        path: PathBuf,
    },
    /// Reading an artifact failed
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// An artifact could not be parsed
    #[error("Failed to parse {what}: {message}")]
    Parse {
        /// What was being parsed (file path or config source)
        what: String,
        /// Parser message
        message: String,
    },
    /// Metadata, lexical index and embedding matrix disagree on row count
    #[error(
        "Artifacts for category '{category}' are not row-aligned: \
         metadata={metadata}, lexical={lexical}, semantic={semantic}"
    )]
    Misaligned {
        /// Category being loaded
        category: Category,
        /// Number of metadata records
        metadata: usize,
        /// Number of term-vector rows
        lexical: usize,
        /// Number of embedding rows
        semantic: usize,
    },
    /// The lexical index was built with a different normalization version
    #[error("Normalization version mismatch: expected v{expected}, index uses v{found}")]
    NormalizationMismatch {
        /// Version this library normalizes queries with
        expected: u32,
        /// Version recorded in the index artifact
        found: u32,
    },
    /// A configuration value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors that can occur while loading or running the semantic encoder.
#[derive(Debug, Clone, Error)]
pub enum EmbeddingError {
    /// Failed to load model weights or configuration
    #[error("Failed to load model: {0}")]
    ModelLoad(String),
    /// Failed to tokenize text
    #[error("Tokenization failed: {0}")]
    TokenizationFailed(String),
    /// Forward pass through the model failed
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    /// No encoder backend is available
    #[error("Encoder unavailable: {0}")]
    Unavailable(String),
    /// Query embedding does not match the corpus matrix
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension of the corpus embedding matrix
        expected: usize,
        /// Dimension produced by the encoder
        actual: usize,
    },
}

/// Errors returned by search requests.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Query text or request parameters are malformed
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    /// The requested category has no loaded index
    #[error("Category '{0}' is not loaded")]
    CategoryNotLoaded(Category),
    /// Unknown category name in a request
    #[error("Unknown category: {0}")]
    UnknownCategory(String),
    /// Configuration problem surfaced at request time
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors returned by the evaluation engine.
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// Query text is empty
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    /// Ranking failed
    #[error(transparent)]
    Search(#[from] SearchError),
}

impl ConfigError {
    /// Builds a [`ConfigError::Parse`] from any displayable parser error.
    pub fn parse(what: impl Into<String>, err: impl std::fmt::Display) -> Self {
        ConfigError::Parse {
            what: what.into(),
            message: err.to_string(),
        }
    }
}


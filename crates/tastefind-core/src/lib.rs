//! # Tastefind Core
//!
//! Hybrid ranking for recipe and culinary-news corpora.
//!
//! A query is ranked by two independent signals, TF-IDF term vectors and
//! sentence embeddings. The candidates are merged, re-checked by a heuristic
//! relevance cascade (including a cooking-method conflict rule), and ordered
//! by a relevance-boosted combined score. A separate evaluation engine
//! measures each ranker against ground truth derived from document content.
//!
//! ## Modules
//!
//! - [`corpus`] - Categories, document records and the metadata store
//! - [`text`] - Versioned normalization and tokenization helpers
//! - [`search`] - Lexical/semantic rankers, fusion, relevance cascade, hybrid engine
//! - [`embedding`] - Encoder trait, initialize-once handle, BERT and hashing encoders
//! - [`evaluation`] - Ground truth, IR metrics, aggregate reports
//! - [`config`] - Tunable thresholds, weights and word lists
//! - [`error`] - Error types
//!
//! ## Example
//!
//! ```ignore
//! use std::{path::Path, sync::Arc};
//! use tastefind_core::config::RankingConfig;
//! use tastefind_core::corpus::Category;
//! use tastefind_core::embedding::EncoderHandle;
//! use tastefind_core::search::{HybridSearchEngine, SearchRequest};
//!
//! let engine = HybridSearchEngine::load(
//!     RankingConfig::default(),
//!     Arc::new(EncoderHandle::bert("models/all-MiniLM-L6-v2")),
//!     Path::new("artifacts"),
//!     &[Category::Food],
//! )?;
//! let response = engine.search(&SearchRequest::new("ayam bakar madu", Category::Food, 10))?;
//! for hit in &response.results {
//!     println!("{:.3} {}", hit.combined_score, hit.title);
//! }
//! ```

pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod evaluation;
pub mod search;
pub mod text;

pub use config::RankingConfig;
pub use corpus::{Category, Document, MetadataStore};
pub use error::{ConfigError, EmbeddingError, EvaluationError, SearchError};
pub use search::{HybridSearchEngine, SearchRequest, SearchResponse};

//! Semantic encoders.
//!
//! ## Core Types
//!
//! - [`QueryEncoder`] - Text to dense vector
//! - [`EncoderHandle`] - Process-wide, initialize-once owner of an encoder
//!
//! ## Implementations
//!
//! - [`BertEncoder`] - Candle BERT with mean pooling (feature `bert`)
//! - [`HashingEncoder`] - Deterministic feature hashing, no model files
//!
//! ## Example
//!
//! ```ignore
//! use tastefind_core::embedding::EncoderHandle;
//!
//! // Nothing is read from disk until the first semantic query.
//! let handle = EncoderHandle::bert("models/all-MiniLM-L6-v2");
//! let encoder = handle.get()?;
//! let vector = encoder.encode("soto ayam")?;
//! ```

mod handle;
mod hashing;
mod traits;

#[cfg(feature = "bert")]
pub mod model;
#[cfg(feature = "bert")]
pub mod tokenizer;

pub use handle::EncoderHandle;
pub use hashing::HashingEncoder;
pub use traits::QueryEncoder;

#[cfg(feature = "bert")]
pub use model::BertEncoder;
#[cfg(feature = "bert")]
pub use tokenizer::TokenizerHandle;

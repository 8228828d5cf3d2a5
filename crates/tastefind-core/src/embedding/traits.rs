//! Encoder abstraction shared by the semantic ranker and the indexer.

use crate::error::EmbeddingError;

/// Turns text into a dense vector.
///
/// The same encoder must produce the corpus embedding matrix and the query
/// vectors; mixing encoders makes cosine scores meaningless.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: one instance is shared by every
/// request in the process.
pub trait QueryEncoder: Send + Sync {
    /// Short identifier for logs and artifact headers.
    fn name(&self) -> &str;

    /// Length of every vector returned by [`encode`](Self::encode).
    fn dimension(&self) -> usize;

    /// Encodes one text.
    ///
    /// # Returns
    ///
    /// Vector of length `dimension()`.
    fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Encodes several texts. The default calls [`encode`](Self::encode) in order.
    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|text| self.encode(text)).collect()
    }
}

//! Hybrid search: two rankers, fusion, and a relevance filter.
//!
//! # Architecture
//!
//! - `types`: Request/response types, [`DocId`], [`Candidate`], [`RelevanceVerdict`]
//! - `lexical`: TF-IDF term-vector index and [`LexicalRanker`]
//! - `semantic`: Dense embedding matrix and [`SemanticRanker`]
//! - `fusion`: Union of the two candidate lists keyed by document id
//! - `relevance`: Tiered relevance cascade with the cooking-method conflict rule
//! - `engine`: [`HybridSearchEngine`] tying the pieces together per category
//!
//! # Pipeline
//!
//! ```text
//! query ─┬─> LexicalRanker  (top candidate_pool, score ≥ lexical_min_score) ─┐
//!        └─> SemanticRanker (top candidate_pool, score ≥ semantic_min_score) ┴─> fuse
//!
//! fuse ─> relevance cascade ─> drop relevance < cutoff
//!      ─> combined = (w_lex·lex + w_sem·sem) × (1 + relevance)
//!      ─> sort desc (ties by index) ─> truncate to top_k
//! ```
//!
//! The candidate pool does not depend on the requested `top_k`, so asking for
//! more results only ever appends to a shorter answer.

pub mod types;

mod engine;
mod fusion;
pub mod lexical;
pub mod relevance;
pub mod semantic;

pub use engine::{CategoryIndex, HybridSearchEngine, DEFAULT_MAX_FEATURES};
pub use fusion::{fuse, FusedScores};
pub use lexical::{LexicalRanker, TermVectorIndex};
pub use relevance::{QueryProfile, RelevanceScorer};
pub use semantic::{EmbeddingMatrix, SemanticRanker};
pub use types::{
    Candidate, DocId, RankedList, RelevanceVerdict, ScoredDocument, SearchRequest, SearchResponse,
};

use std::cmp::Ordering;

/// Keeps scores ≥ `min_score`, sorts them best first and truncates to `top_k`.
///
/// Equal scores are ordered by ascending id so output is deterministic.
pub(crate) fn select_top(
    scores: impl Iterator<Item = (DocId, f32)>,
    min_score: f32,
    top_k: usize,
) -> RankedList {
    let mut kept: RankedList = scores
        .filter(|(_, score)| score.is_finite() && *score >= min_score)
        .collect();
    kept.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    kept.truncate(top_k);
    kept
}

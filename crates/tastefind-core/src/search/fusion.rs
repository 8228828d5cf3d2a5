//! Candidate fusion: union of the lexical and semantic lists by document id.

use super::types::{DocId, RankedList};
use std::collections::HashMap;

/// Both similarity scores for one document id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusedScores {
    /// Document id
    pub id: DocId,
    /// Lexical score, 0.0 if the lexical ranker did not return the id
    pub lexical_score: f32,
    /// Semantic score, 0.0 if the semantic ranker did not return the id
    pub semantic_score: f32,
}

/// Merges two ranked lists into one entry per distinct id.
///
/// Entries appear in lexical order, followed by ids only the semantic ranker
/// returned, in semantic order. Scores are not combined here; that happens
/// after the relevance cascade.
///
/// # Arguments
///
/// * `lexical` - Output of the lexical ranker
/// * `semantic` - Output of the semantic ranker (may be empty)
pub fn fuse(lexical: &RankedList, semantic: &RankedList) -> Vec<FusedScores> {
    let mut fused: Vec<FusedScores> = Vec::with_capacity(lexical.len() + semantic.len());
    let mut position: HashMap<DocId, usize> = HashMap::new();

    for &(id, score) in lexical {
        if position.contains_key(&id) {
            continue;
        }
        position.insert(id, fused.len());
        fused.push(FusedScores {
            id,
            lexical_score: score,
            semantic_score: 0.0,
        });
    }

    for &(id, score) in semantic {
        match position.get(&id) {
            Some(&i) => fused[i].semantic_score = score,
            None => {
                position.insert(id, fused.len());
                fused.push(FusedScores {
                    id,
                    lexical_score: 0.0,
                    semantic_score: score,
                });
            }
        }
    }

    fused
}

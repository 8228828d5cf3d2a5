//! Content-derived relevance judgments.
//!
//! There is no labelled query set, so relevance is decided by scanning every
//! document in the category for the query's tokens. The rule is a
//! [`GroundTruthPolicy`]: by default one token hit in the body is enough.

use crate::config::GroundTruthPolicy;
use crate::corpus::Document;
use crate::search::DocId;
use crate::text::{significant_tokens, word_tokens};
use std::collections::{BTreeSet, HashSet};

/// Documents judged relevant to one query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroundTruthSet {
    ids: BTreeSet<DocId>,
}

impl GroundTruthSet {
    /// Scans `documents` and keeps those matching `query` under `policy`.
    ///
    /// A query with no token of at least `policy.min_token_len` characters
    /// matches nothing.
    pub fn build(query: &str, documents: &[Document], policy: &GroundTruthPolicy) -> Self {
        let tokens = significant_tokens(query, policy.min_token_len);
        if tokens.is_empty() {
            return Self::default();
        }
        let needed = policy.min_token_hits.clamp(1, tokens.len());

        let ids = documents
            .iter()
            .filter(|doc| {
                let text = if policy.include_title {
                    doc.full_text()
                } else {
                    doc.body.clone()
                };
                let doc_tokens: HashSet<String> = word_tokens(&text).into_iter().collect();
                tokens.iter().filter(|t| doc_tokens.contains(*t)).count() >= needed
            })
            .map(|doc| doc.id)
            .collect();
        Self { ids }
    }

    /// Builds a set from explicit ids.
    pub fn from_ids(ids: impl IntoIterator<Item = DocId>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    /// Whether `id` is relevant.
    pub fn contains(&self, id: DocId) -> bool {
        self.ids.contains(&id)
    }

    /// Number of relevant documents.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if nothing is relevant.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Relevant ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = DocId> + '_ {
        self.ids.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Category;

    fn docs() -> Vec<Document> {
        vec![
            Document::new(DocId::from_index(0), Category::Food, "Soto", "ayam kunyit serai"),
            Document::new(DocId::from_index(1), Category::Food, "Ayam bakar", "kecap madu"),
            Document::new(DocId::from_index(2), Category::Food, "Es teh", "teh gula es batu"),
        ]
    }

    #[test]
    fn test_one_hit_in_body_is_relevant() {
        let truth = GroundTruthSet::build("ayam goreng", &docs(), &GroundTruthPolicy::default());
        // doc 1 only mentions ayam in its title, which is ignored by default
        assert_eq!(truth.iter().collect::<Vec<_>>(), vec![DocId::from_index(0)]);
    }

    #[test]
    fn test_include_title() {
        let policy = GroundTruthPolicy {
            include_title: true,
            ..GroundTruthPolicy::default()
        };
        let truth = GroundTruthSet::build("ayam", &docs(), &policy);
        assert_eq!(truth.len(), 2);
        assert!(truth.contains(DocId::from_index(1)));
    }

    #[test]
    fn test_min_token_hits() {
        let policy = GroundTruthPolicy {
            min_token_hits: 2,
            ..GroundTruthPolicy::default()
        };
        let truth = GroundTruthSet::build("teh gula", &docs(), &policy);
        assert_eq!(truth.iter().collect::<Vec<_>>(), vec![DocId::from_index(2)]);
        assert!(GroundTruthSet::build("teh kopi", &docs(), &policy).is_empty());
    }

    #[test]
    fn test_short_tokens_ignored() {
        // "es" is shorter than the minimum token length
        assert!(GroundTruthSet::build("es", &docs(), &GroundTruthPolicy::default()).is_empty());
    }

    #[test]
    fn test_hits_requirement_capped_by_query_tokens() {
        let policy = GroundTruthPolicy {
            min_token_hits: 5,
            ..GroundTruthPolicy::default()
        };
        assert_eq!(GroundTruthSet::build("gula", &docs(), &policy).len(), 1);
    }
}

//! Property tests for the relevance cascade, the IR metrics and the ranking
//! pipeline.
//!
//! Search properties run against small random corpora drawn from a fixed
//! Indonesian vocabulary, indexed in memory with the hashing encoder.

use proptest::prelude::*;
use std::sync::Arc;
use tastefind_core::config::{CookingMethod, RankingConfig};
use tastefind_core::corpus::{Category, Document, MetadataStore};
use tastefind_core::embedding::{EncoderHandle, HashingEncoder};
use tastefind_core::evaluation::{average_precision, f1, precision, recall, GroundTruthSet};
use tastefind_core::search::{
    CategoryIndex, DocId, HybridSearchEngine, RelevanceScorer, SearchRequest,
};
use tastefind_core::text::NormalizationSpec;

const VOCABULARY: &[&str] = &[
    "ayam", "sapi", "ikan", "soto", "teh", "gula", "kunyit", "madu", "pedas", "santan", "nasi",
    "sambal",
];

// =============================================================================
// Strategies
// =============================================================================

fn word() -> impl Strategy<Value = &'static str> {
    prop::sample::select(VOCABULARY)
}

fn phrase(min: usize, max: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(word(), min..=max).prop_map(|w| w.join(" "))
}

fn corpus() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec((phrase(1, 3), phrase(2, 6)), 1..8)
}

/// (query form, conflicting document form) pairs from the default table.
fn conflicting_forms() -> Vec<(String, String)> {
    let methods = CookingMethod::defaults();
    let mut pairs = Vec::new();
    for method in &methods {
        for other in methods
            .iter()
            .filter(|o| method.conflicts_with.contains(&o.name))
        {
            for query_form in &method.forms {
                for doc_form in &other.forms {
                    pairs.push((query_form.clone(), doc_form.clone()));
                }
            }
        }
    }
    pairs
}

fn doc(title: &str, body: &str) -> Document {
    Document::new(DocId::from_index(0), Category::Food, title, body)
}

fn engine(docs: &[(String, String)]) -> HybridSearchEngine {
    let metadata = MetadataStore::from_documents(
        Category::Food,
        docs.iter()
            .map(|(t, b)| doc(t, b))
            .collect(),
    );
    let encoder = HashingEncoder::new(128);
    let index = CategoryIndex::build(metadata, NormalizationSpec::default(), 0, &encoder)
        .expect("hashing encoder never fails");
    HybridSearchEngine::new(
        RankingConfig::default(),
        Arc::new(EncoderHandle::ready(Arc::new(encoder))),
    )
    .expect("default config is valid")
    .with_index(index)
}

fn id_set(ids: &std::collections::HashSet<u32>) -> GroundTruthSet {
    GroundTruthSet::from_ids(ids.iter().map(|&i| DocId::from_index(i as usize)))
}

// =============================================================================
// Relevance cascade
// =============================================================================

proptest! {
    #[test]
    fn relevance_score_is_bounded(query in ".{0,40}", title in ".{0,40}", body in ".{0,120}") {
        let scorer = RelevanceScorer::new(&RankingConfig::default());
        let verdict = scorer.score_query(&query, &doc(&title, &body));
        prop_assert!((0.0..=1.0).contains(&verdict.score), "score {}", verdict.score);
    }

    #[test]
    fn exact_title_phrase_scores_one(
        prefix in phrase(0, 2),
        query in phrase(1, 3),
        suffix in phrase(0, 2),
        body in phrase(0, 6),
    ) {
        let scorer = RelevanceScorer::new(&RankingConfig::default());
        let title = format!("{} {} {}", prefix, query.to_uppercase(), suffix);
        let verdict = scorer.score_query(&query, &doc(&title, &body));
        prop_assert_eq!(verdict.score, 1.0);
        prop_assert!(!verdict.rejected);
    }

    #[test]
    fn conflicting_method_is_rejected(
        forms in prop::sample::select(conflicting_forms()),
        noun in word().prop_filter("three letters or more", |w| w.len() >= 3),
        extra in phrase(0, 4),
    ) {
        let (query_form, doc_form) = forms;
        let scorer = RelevanceScorer::new(&RankingConfig::default());
        let query = format!("{} {}", query_form, noun);
        let document = doc(&format!("{} {}", doc_form, noun), &extra);

        let verdict = scorer.score_query(&query, &document);
        prop_assert!(verdict.rejected, "'{}' vs '{}'", query, document.title);
        prop_assert_eq!(verdict.score, 0.0);
    }
}

// =============================================================================
// Metrics
// =============================================================================

proptest! {
    #[test]
    fn metrics_are_bounded(
        retrieved in prop::collection::hash_set(0u32..40, 0..20),
        relevant in prop::collection::hash_set(0u32..40, 0..20),
    ) {
        let retrieved: Vec<DocId> = retrieved.iter().map(|&i| DocId::from_index(i as usize)).collect();
        let truth = id_set(&relevant);

        let p = precision(&retrieved, &truth);
        let r = recall(&retrieved, &truth);
        let f = f1(p, r);
        let ap = average_precision(&retrieved, &truth);

        for value in [p, r, f, ap] {
            prop_assert!((0.0..=1.0).contains(&value), "value {}", value);
        }
        if p + r == 0.0 {
            prop_assert_eq!(f, 0.0);
        }
        if truth.is_empty() || retrieved.is_empty() {
            prop_assert_eq!(ap, 0.0);
        }
    }
}

// =============================================================================
// Ranking pipeline
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn search_is_deterministic(docs in corpus(), query in phrase(1, 2)) {
        let engine = engine(&docs);
        let request = SearchRequest::new(query, Category::Food, 10);
        let first = engine.search(&request).unwrap();
        let second = engine.search(&request).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn smaller_top_k_is_a_prefix(
        docs in corpus(),
        query in phrase(1, 2),
        small in 1usize..5,
        extra in 0usize..5,
    ) {
        let engine = engine(&docs);
        let large = small + extra;
        let short = engine
            .search(&SearchRequest::new(query.clone(), Category::Food, small))
            .unwrap();
        let long = engine
            .search(&SearchRequest::new(query, Category::Food, large))
            .unwrap();

        prop_assert!(short.results.len() <= long.results.len());
        prop_assert_eq!(&short.results[..], &long.results[..short.results.len()]);
    }

    #[test]
    fn results_respect_cutoff_and_order(docs in corpus(), query in phrase(1, 2)) {
        let engine = engine(&docs);
        let cutoff = engine.config().relevance_cutoff;
        let response = engine
            .search(&SearchRequest::new(query, Category::Food, 20))
            .unwrap();

        prop_assert_eq!(response.total_results, response.results.len());
        for hit in &response.results {
            prop_assert!(hit.relevance_score >= cutoff && hit.relevance_score <= 1.0);
        }
        for pair in response.results.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(a.is_exact_title_match() || !b.is_exact_title_match());
            if a.is_exact_title_match() == b.is_exact_title_match() {
                prop_assert!(a.combined_score >= b.combined_score);
            }
        }
    }
}

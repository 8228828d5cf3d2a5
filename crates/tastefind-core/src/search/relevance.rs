//! Heuristic relevance cascade.
//!
//! Vector similarity alone happily returns "fried chicken" for "grilled
//! chicken". Each fused candidate is therefore re-checked against the raw
//! query text. The first tier that applies decides the score:
//!
//! | Tier | Condition                                         | Relevance        |
//! |------|---------------------------------------------------|------------------|
//! | 1    | query phrase inside the title                     | 1.0              |
//! | 2    | query phrase inside title + body                  | 0.9              |
//! | 3    | every query token present                         | 0.7 (0 on conflict) |
//! | 4    | token overlap ≥ `partial_overlap_threshold`       | 0.4 × overlap (0 on conflict) |
//! | 5    | anything else                                     | 0.1 × overlap    |
//!
//! Phrases are compared lowercased with whitespace collapsed. Tokens are
//! alphanumeric runs; query tokens shorter than `min_query_token_len` are
//! ignored.
//!
//! # Cooking-method conflicts
//!
//! When the query names exactly one cooking method, a document that names a
//! method conflicting with it, and not the query's own method, is
//! contextually wrong and is rejected outright.

use super::types::RelevanceVerdict;
use crate::config::RankingConfig;
use crate::corpus::Document;
use crate::text::{normalize_phrase, significant_tokens, word_tokens};
use std::collections::{BTreeSet, HashMap, HashSet};

const EXACT_TITLE: f32 = 1.0;
const EXACT_TEXT: f32 = 0.9;
const ALL_TOKENS: f32 = 0.7;
const PARTIAL_FACTOR: f32 = 0.4;
const WEAK_FACTOR: f32 = 0.1;

/// Query-side analysis reused across every candidate of one request.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryProfile {
    phrase: String,
    tokens: Vec<String>,
    method: Option<usize>,
}

impl QueryProfile {
    /// Normalized query phrase.
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    /// Significant query tokens, deduplicated.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

/// Scores candidates with the relevance cascade.
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    method_names: Vec<String>,
    method_by_form: HashMap<String, usize>,
    conflicts: Vec<HashSet<usize>>,
    min_query_token_len: usize,
    partial_overlap_threshold: f32,
    cutoff: f32,
}

impl RelevanceScorer {
    /// Builds a scorer from the cooking table and thresholds in `config`.
    ///
    /// Conflicts naming unknown methods are ignored; [`RankingConfig::validate`]
    /// reports them.
    pub fn new(config: &RankingConfig) -> Self {
        let index: HashMap<&str, usize> = config
            .cooking_methods
            .iter()
            .enumerate()
            .map(|(i, m)| (m.name.as_str(), i))
            .collect();

        let mut method_by_form = HashMap::new();
        for (i, method) in config.cooking_methods.iter().enumerate() {
            method_by_form.insert(method.name.to_lowercase(), i);
            for form in &method.forms {
                method_by_form.insert(form.to_lowercase(), i);
            }
        }

        let conflicts = config
            .cooking_methods
            .iter()
            .map(|m| {
                m.conflicts_with
                    .iter()
                    .filter_map(|name| index.get(name.as_str()).copied())
                    .collect()
            })
            .collect();

        Self {
            method_names: config
                .cooking_methods
                .iter()
                .map(|m| m.name.clone())
                .collect(),
            method_by_form,
            conflicts,
            min_query_token_len: config.min_query_token_len,
            partial_overlap_threshold: config.partial_overlap_threshold,
            cutoff: config.relevance_cutoff,
        }
    }

    /// Analyzes the query once per request.
    pub fn profile(&self, query: &str) -> QueryProfile {
        let methods = self.methods_in(&word_tokens(query));
        QueryProfile {
            phrase: normalize_phrase(query),
            tokens: significant_tokens(query, self.min_query_token_len),
            method: if methods.len() == 1 {
                methods.into_iter().next()
            } else {
                None
            },
        }
    }

    /// Runs the cascade for one document.
    pub fn score(&self, profile: &QueryProfile, doc: &Document) -> RelevanceVerdict {
        let title = normalize_phrase(&doc.title);
        let full = normalize_phrase(&doc.full_text());

        if !profile.phrase.is_empty() {
            if title.contains(&profile.phrase) {
                return self.verdict(EXACT_TITLE, false);
            }
            if full.contains(&profile.phrase) {
                return self.verdict(EXACT_TEXT, false);
            }
        }

        if profile.tokens.is_empty() {
            return self.verdict(0.0, false);
        }

        let doc_tokens: HashSet<String> = word_tokens(&full).into_iter().collect();
        let hits = profile
            .tokens
            .iter()
            .filter(|t| doc_tokens.contains(*t))
            .count();
        let overlap = hits as f32 / profile.tokens.len() as f32;

        if hits == profile.tokens.len() {
            return if self.conflicts_with(profile, &doc_tokens) {
                self.verdict(0.0, true)
            } else {
                self.verdict(ALL_TOKENS, false)
            };
        }

        if overlap >= self.partial_overlap_threshold {
            return if self.conflicts_with(profile, &doc_tokens) {
                self.verdict(0.0, true)
            } else {
                self.verdict(PARTIAL_FACTOR * overlap, false)
            };
        }

        self.verdict(WEAK_FACTOR * overlap, false)
    }

    /// Convenience wrapper: profile `query` and score `doc`.
    pub fn score_query(&self, query: &str, doc: &Document) -> RelevanceVerdict {
        self.score(&self.profile(query), doc)
    }

    /// Whether `text` contradicts the single cooking method named in `query`.
    pub fn has_cooking_conflict(&self, query: &str, text: &str) -> bool {
        let profile = self.profile(query);
        let tokens: HashSet<String> = word_tokens(text).into_iter().collect();
        self.conflicts_with(&profile, &tokens)
    }

    /// Canonical names of the cooking methods mentioned in `text`.
    pub fn cooking_methods_in(&self, text: &str) -> Vec<&str> {
        self.methods_in(&word_tokens(text))
            .into_iter()
            .map(|i| self.method_names[i].as_str())
            .collect()
    }

    fn methods_in<'t>(&self, tokens: impl IntoIterator<Item = &'t String>) -> BTreeSet<usize> {
        tokens
            .into_iter()
            .filter_map(|t| self.method_by_form.get(t.as_str()).copied())
            .collect()
    }

    fn conflicts_with(&self, profile: &QueryProfile, doc_tokens: &HashSet<String>) -> bool {
        let Some(query_method) = profile.method else {
            return false;
        };
        let doc_methods = self.methods_in(doc_tokens);
        !doc_methods.contains(&query_method)
            && doc_methods
                .iter()
                .any(|m| self.conflicts[query_method].contains(m))
    }

    fn verdict(&self, score: f32, conflict: bool) -> RelevanceVerdict {
        RelevanceVerdict {
            score,
            rejected: conflict || score < self.cutoff,
        }
    }
}

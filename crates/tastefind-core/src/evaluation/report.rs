//! Evaluation results and the shared aggregate-report cache.

use super::metrics::{AggregateMetrics, RankerMetrics};
use crate::corpus::Category;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Ranker being evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ranker {
    /// TF-IDF term vectors
    #[serde(alias = "tfidf")]
    Lexical,
    /// Sentence embeddings
    #[serde(alias = "sbert")]
    Semantic,
}

impl Ranker {
    /// Both rankers, lexical first.
    pub fn all() -> &'static [Ranker] {
        &[Ranker::Lexical, Ranker::Semantic]
    }

    /// Serialized name.
    pub fn name(&self) -> &'static str {
        match self {
            Ranker::Lexical => "lexical",
            Ranker::Semantic => "semantic",
        }
    }
}

impl fmt::Display for Ranker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Ranker {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lexical" | "tfidf" => Ok(Ranker::Lexical),
            "semantic" | "sbert" => Ok(Ranker::Semantic),
            other => Err(format!("unknown ranker '{}'", other)),
        }
    }
}

/// Per-ranker metrics for a single query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEvaluation {
    /// Query text
    pub query: String,
    /// Category evaluated
    pub category: Category,
    /// Ranked-list length requested from each ranker
    pub top_k: usize,
    /// Size of the ground-truth set
    pub relevant_count: usize,
    /// Metrics keyed by ranker name
    pub metrics: BTreeMap<Ranker, RankerMetrics>,
}

/// Metrics averaged over a sample of synthetic queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Category evaluated
    pub category: Category,
    /// Ranked-list length requested from each ranker
    pub top_k: usize,
    /// Number of sampled queries
    pub query_count: usize,
    /// The sampled queries, most frequent first
    pub queries: Vec<String>,
    /// Averaged metrics keyed by ranker name
    pub metrics: BTreeMap<Ranker, AggregateMetrics>,
}

impl EvaluationReport {
    /// A report with no queries and all-zero metrics for every ranker.
    pub fn empty(category: Category, top_k: usize) -> Self {
        Self {
            category,
            top_k,
            query_count: 0,
            queries: Vec::new(),
            metrics: Ranker::all()
                .iter()
                .map(|r| (*r, AggregateMetrics::default()))
                .collect(),
        }
    }
}

/// Computes the aggregate report at most once and shares it.
///
/// Concurrent callers block until the first computation finishes and then
/// all receive the same snapshot. A failed computation leaves the cache
/// empty so a later call can retry.
#[derive(Debug, Default)]
pub struct ReportCache {
    cell: OnceCell<Arc<EvaluationReport>>,
}

impl ReportCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cache already holding `report` (e.g. read from disk).
    pub fn with_report(report: EvaluationReport) -> Self {
        Self {
            cell: OnceCell::with_value(Arc::new(report)),
        }
    }

    /// Returns the cached report, computing it with `compute` if absent.
    pub fn get_or_compute<E, F>(&self, compute: F) -> Result<Arc<EvaluationReport>, E>
    where
        F: FnOnce() -> Result<EvaluationReport, E>,
    {
        self.cell
            .get_or_try_init(|| compute().map(Arc::new))
            .cloned()
    }

    /// The cached report, if computed.
    pub fn get(&self) -> Option<Arc<EvaluationReport>> {
        self.cell.get().cloned()
    }
}

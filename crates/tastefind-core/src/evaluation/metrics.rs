//! Binary-relevance IR metrics.
//!
//! All functions take the ranked ids a ranker returned and the set of ids
//! judged relevant, and return values in [0, 1]. Empty inputs yield 0 rather
//! than dividing by zero.
//!
//! # Formulas
//!
//! ```text
//! precision = |retrieved ∩ relevant| / |retrieved|
//! recall    = |retrieved ∩ relevant| / |relevant|
//! f1        = 2·p·r / (p + r)
//! AP        = (Σ over relevant hits at rank i of hits_so_far / i) / hits
//! ```
//!
//! AP divides by the hits found in the list, not by `|relevant|`, so it
//! measures how early the retrieved relevant documents appear.

use super::ground_truth::GroundTruthSet;
use crate::search::DocId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Number of distinct retrieved ids that are relevant.
fn hits(retrieved: &[DocId], relevant: &GroundTruthSet) -> usize {
    retrieved
        .iter()
        .collect::<HashSet<_>>()
        .into_iter()
        .filter(|id| relevant.contains(**id))
        .count()
}

/// Fraction of retrieved documents that are relevant.
pub fn precision(retrieved: &[DocId], relevant: &GroundTruthSet) -> f64 {
    if retrieved.is_empty() {
        return 0.0;
    }
    hits(retrieved, relevant) as f64 / retrieved.len() as f64
}

/// Fraction of relevant documents that were retrieved.
pub fn recall(retrieved: &[DocId], relevant: &GroundTruthSet) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }
    hits(retrieved, relevant) as f64 / relevant.len() as f64
}

/// Harmonic mean of precision and recall; 0 when both are 0.
pub fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        return 0.0;
    }
    2.0 * precision * recall / (precision + recall)
}

/// Average precision over the hits in `retrieved`.
///
/// # Example
///
/// ```text
/// ranked:   [R, N, R]      (R = relevant, N = not)
/// AP = (1/1 + 2/3) / 2 = 0.833
/// ```
pub fn average_precision(retrieved: &[DocId], relevant: &GroundTruthSet) -> f64 {
    let mut seen = HashSet::new();
    let mut found = 0usize;
    let mut sum = 0.0;

    for (i, id) in retrieved.iter().enumerate() {
        if relevant.contains(*id) && seen.insert(*id) {
            found += 1;
            sum += found as f64 / (i + 1) as f64;
        }
    }

    if found == 0 {
        0.0
    } else {
        sum / found as f64
    }
}

/// Metrics for one ranker on one query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RankerMetrics {
    /// Precision of the ranked list
    pub precision: f64,
    /// Recall against the ground truth
    pub recall: f64,
    /// F1 score
    pub f1: f64,
    /// Average precision
    pub average_precision: f64,
    /// Wall-clock ranking latency in milliseconds
    pub runtime_ms: f64,
    /// Size of the ground-truth set
    pub relevant_count: usize,
    /// Length of the ranked list
    pub retrieved_count: usize,
}

impl RankerMetrics {
    /// Computes every metric for a ranked list.
    ///
    /// With an empty ground truth all quality metrics are 0.
    pub fn compute(retrieved: &[DocId], relevant: &GroundTruthSet, runtime_ms: f64) -> Self {
        let p = precision(retrieved, relevant);
        let r = recall(retrieved, relevant);
        Self {
            precision: p,
            recall: r,
            f1: f1(p, r),
            average_precision: average_precision(retrieved, relevant),
            runtime_ms,
            relevant_count: relevant.len(),
            retrieved_count: retrieved.len(),
        }
    }
}

/// Metrics for one ranker averaged over a query sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateMetrics {
    /// Mean precision
    pub precision: f64,
    /// Mean recall
    pub recall: f64,
    /// Mean F1
    pub f1: f64,
    /// Mean average precision (MAP)
    pub average_precision: f64,
    /// Mean ranking latency in milliseconds
    pub runtime_ms: f64,
    /// Mean ground-truth size
    pub relevant_count: f64,
    /// Mean ranked-list length
    pub retrieved_count: f64,
}

impl AggregateMetrics {
    /// Averages per-query metrics; all zeros for an empty sample.
    pub fn mean(samples: &[RankerMetrics]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let n = samples.len() as f64;
        let avg = |f: fn(&RankerMetrics) -> f64| samples.iter().map(f).sum::<f64>() / n;
        Self {
            precision: avg(|m| m.precision),
            recall: avg(|m| m.recall),
            f1: avg(|m| m.f1),
            average_precision: avg(|m| m.average_precision),
            runtime_ms: avg(|m| m.runtime_ms),
            relevant_count: avg(|m| m.relevant_count as f64),
            retrieved_count: avg(|m| m.retrieved_count as f64),
        }
    }
}

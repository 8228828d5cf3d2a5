//! Retrieval-quality evaluation.
//!
//! No hand-labelled query set exists for these corpora, so evaluation derives
//! its own judgments:
//!
//! | Mode | Queries | Ground truth |
//! |------|---------|--------------|
//! | Single query ([`EvaluationEngine::evaluate_query`]) | caller-supplied | token hits in every document |
//! | Aggregate ([`EvaluationEngine::evaluate`]) | most frequent corpus tokens | same, per sampled query |
//!
//! Each ranker is measured on its own (before fusion and relevance
//! filtering) with precision, recall, F1 and average precision, plus the
//! wall-clock ranking latency.
//!
//! The aggregate mode ranks every sampled query and is meant to run once;
//! [`ReportCache`] shares the result between concurrent callers.
//!
//! # Example
//!
//! ```ignore
//! use tastefind_core::evaluation::{EvaluationEngine, Ranker};
//!
//! let eval = EvaluationEngine::new(&search_engine);
//! let single = eval.evaluate_query(Category::Food, "ayam bakar", Ranker::all(), 20)?;
//! println!("lexical AP = {}", single.metrics[&Ranker::Lexical].average_precision);
//!
//! let report = eval.evaluate(Category::Food)?;
//! ```

mod engine;
pub mod ground_truth;
pub mod metrics;
mod report;
pub mod sampling;

pub use engine::EvaluationEngine;
pub use ground_truth::GroundTruthSet;
pub use metrics::{average_precision, f1, precision, recall, AggregateMetrics, RankerMetrics};
pub use report::{EvaluationReport, QueryEvaluation, Ranker, ReportCache};
pub use sampling::sample_queries;

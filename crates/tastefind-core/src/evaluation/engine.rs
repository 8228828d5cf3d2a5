//! Evaluation runs over a loaded search engine.
//!
//! Two entry points:
//!
//! - [`EvaluationEngine::evaluate_query`] builds the ground truth for one
//!   query, runs each requested ranker with `top_k` and reports precision,
//!   recall, f1, average precision and runtime per ranker.
//! - [`EvaluationEngine::evaluate`] samples frequent corpus terms as queries,
//!   evaluates each one and averages the metrics per ranker.
//!
//! Rankers run without the relevance filter, so the numbers describe the raw
//! lexical and semantic rankings.

use super::ground_truth::GroundTruthSet;
use super::metrics::{AggregateMetrics, RankerMetrics};
use super::report::{EvaluationReport, QueryEvaluation, Ranker};
use super::sampling::sample_queries;
use crate::config::EvaluationConfig;
use crate::corpus::Category;
use crate::error::EvaluationError;
use crate::search::{DocId, HybridSearchEngine};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Measures each ranker against content-derived ground truth.
///
/// Borrows a loaded [`HybridSearchEngine`] and runs its lexical and
/// semantic rankers directly, without the relevance filter.
pub struct EvaluationEngine<'a> {
    search: &'a HybridSearchEngine,
    config: EvaluationConfig,
}

impl<'a> EvaluationEngine<'a> {
    /// Uses the evaluation settings of the engine's configuration.
    pub fn new(search: &'a HybridSearchEngine) -> Self {
        Self {
            config: search.config().evaluation.clone(),
            search,
        }
    }

    /// Overrides the evaluation settings.
    pub fn with_config(mut self, config: EvaluationConfig) -> Self {
        self.config = config;
        self
    }

    /// Active evaluation settings.
    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Evaluates `rankers` on one query.
    ///
    /// # Arguments
    ///
    /// * `category` - Corpus to evaluate against
    /// * `query` - Query text
    /// * `rankers` - Rankers to measure (duplicates are evaluated once)
    /// * `top_k` - Ranked-list length requested from each ranker
    ///
    /// # Errors
    ///
    /// Returns `EvaluationError::InvalidQuery` for an empty query or
    /// `top_k == 0`, and `EvaluationError::Search` if the category is not
    /// loaded. A query that matches nothing is not an error: its metrics are 0.
    #[instrument(skip_all, fields(category = %category, top_k))]
    pub fn evaluate_query(
        &self,
        category: Category,
        query: &str,
        rankers: &[Ranker],
        top_k: usize,
    ) -> Result<QueryEvaluation, EvaluationError> {
        if query.trim().is_empty() {
            return Err(EvaluationError::InvalidQuery(
                "query must not be empty".to_string(),
            ));
        }
        if top_k == 0 {
            return Err(EvaluationError::InvalidQuery(
                "top_k must be greater than 0".to_string(),
            ));
        }

        let index = self.search.index(category)?;
        let truth = GroundTruthSet::build(
            query,
            index.metadata().documents(),
            &self.config.ground_truth,
        );

        let mut metrics = BTreeMap::new();
        for &ranker in rankers {
            if metrics.contains_key(&ranker) {
                continue;
            }
            let start = Instant::now();
            let ranked = match ranker {
                Ranker::Lexical => self.search.rank_lexical(category, query, top_k)?,
                Ranker::Semantic => self.search.rank_semantic(category, query, top_k)?,
            };
            let runtime_ms = start.elapsed().as_secs_f64() * 1000.0;

            let ids: Vec<DocId> = ranked.into_iter().map(|(id, _)| id).collect();
            metrics.insert(ranker, RankerMetrics::compute(&ids, &truth, runtime_ms));
        }

        debug!(
            "Evaluated '{}': {} relevant documents",
            query,
            truth.len()
        );
        Ok(QueryEvaluation {
            query: query.to_string(),
            category,
            top_k,
            relevant_count: truth.len(),
            metrics,
        })
    }

    /// Aggregate evaluation over sampled frequent tokens.
    ///
    /// Expensive: ranks every sampled query with both rankers. Compute once
    /// and cache (see [`ReportCache`](super::ReportCache)).
    pub fn evaluate(&self, category: Category) -> Result<EvaluationReport, EvaluationError> {
        self.evaluate_with_progress(category, |_, _, _| {})
    }

    /// Like [`evaluate`](Self::evaluate), calling `on_query(done, total, query)`
    /// after each sampled query.
    #[instrument(skip_all, fields(category = %category))]
    pub fn evaluate_with_progress<F>(
        &self,
        category: Category,
        mut on_query: F,
    ) -> Result<EvaluationReport, EvaluationError>
    where
        F: FnMut(usize, usize, &str),
    {
        let index = self.search.index(category)?;
        let queries = sample_queries(
            index.metadata().documents(),
            self.config.min_sample_token_len,
            self.config.sample_size,
        );
        if queries.is_empty() {
            info!("No sample queries for '{}', returning empty report", category);
            return Ok(EvaluationReport::empty(category, self.config.top_k));
        }
        info!("Evaluating {} sampled queries", queries.len());

        let mut per_ranker: BTreeMap<Ranker, Vec<RankerMetrics>> = BTreeMap::new();
        for (i, query) in queries.iter().enumerate() {
            let evaluation =
                self.evaluate_query(category, query, Ranker::all(), self.config.top_k)?;
            for (ranker, metrics) in evaluation.metrics {
                per_ranker.entry(ranker).or_default().push(metrics);
            }
            on_query(i + 1, queries.len(), query);
        }

        let metrics = Ranker::all()
            .iter()
            .map(|ranker| {
                let samples = per_ranker.get(ranker).map(Vec::as_slice).unwrap_or(&[]);
                (*ranker, AggregateMetrics::mean(samples))
            })
            .collect();

        Ok(EvaluationReport {
            category,
            top_k: self.config.top_k,
            query_count: queries.len(),
            queries,
            metrics,
        })
    }
}

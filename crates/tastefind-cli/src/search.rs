//! Command implementations.
//!
//! Each command loads only the categories it needs from the artifacts
//! directory, runs one operation and returns the core result type for the
//! output module to format.

use crate::config;
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tastefind_core::config::RankingConfig;
use tastefind_core::corpus::{Category, MetadataStore};
use tastefind_core::embedding::EncoderHandle;
use tastefind_core::error::ConfigError;
use tastefind_core::evaluation::{EvaluationEngine, QueryEvaluation, Ranker};
use tastefind_core::search::{CategoryIndex, HybridSearchEngine, SearchRequest, SearchResponse};
use tastefind_core::text::NormalizationSpec;
use tracing::{info, warn};

/// Loads a search engine holding the single `category`.
fn load_engine(
    artifacts: &Path,
    category: Category,
    ranking: RankingConfig,
    encoder: EncoderHandle,
) -> Result<HybridSearchEngine> {
    config::ensure_artifacts_dir(artifacts)?;
    info!("Loading '{}' from {}", category, artifacts.display());
    HybridSearchEngine::load(ranking, Arc::new(encoder), artifacts, &[category])
        .with_context(|| format!("Failed to load category '{}'", category))
}

/// Runs a hybrid search.
///
/// # Arguments
///
/// * `artifacts` - Artifacts directory
/// * `request` - Query, category and result count
/// * `ranking` - Ranking configuration
/// * `encoder` - Semantic encoder (may be unavailable)
pub fn execute_search(
    artifacts: &Path,
    request: &SearchRequest,
    ranking: RankingConfig,
    encoder: EncoderHandle,
) -> Result<SearchResponse> {
    let engine = load_engine(artifacts, request.category, ranking, encoder)?;
    let response = engine
        .search(request)
        .map_err(|e| anyhow!("Search failed: {}", e))?;
    if response.semantic_degraded {
        warn!("Semantic ranking unavailable, results are lexical-only");
    }
    Ok(response)
}

/// Evaluates each ranker on a single query.
pub fn execute_evaluate_query(
    artifacts: &Path,
    category: Category,
    query: &str,
    rankers: &[Ranker],
    top_k: usize,
    ranking: RankingConfig,
    encoder: EncoderHandle,
) -> Result<QueryEvaluation> {
    let engine = load_engine(artifacts, category, ranking, encoder)?;
    EvaluationEngine::new(&engine)
        .evaluate_query(category, query, rankers, top_k)
        .map_err(|e| anyhow!("Evaluation failed: {}", e))
}

/// Builds `lexical/` and `embeddings/` artifacts from `metadata/`.
///
/// With an empty `categories` list every category whose metadata file exists
/// is indexed; explicitly named categories must have metadata.
///
/// # Returns
///
/// The paths written, in category order.
pub fn execute_index(
    artifacts: &Path,
    categories: &[Category],
    max_features: usize,
    encoder: &EncoderHandle,
) -> Result<Vec<PathBuf>> {
    config::ensure_artifacts_dir(artifacts)?;
    let encoder = encoder
        .get()
        .map_err(|e| anyhow!("Indexing needs a working encoder: {}", e))?;

    let explicit = !categories.is_empty();
    let targets = if explicit {
        categories.to_vec()
    } else {
        Category::all().to_vec()
    };

    let mut written = Vec::new();
    for category in targets {
        let metadata = match MetadataStore::load(artifacts, category) {
            Ok(metadata) => metadata,
            Err(ConfigError::MissingArtifact { path, .. }) if !explicit => {
                info!("Skipping '{}': no {}", category, path.display());
                continue;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to load metadata for '{}'", category))
            }
        };

        info!(
            "Indexing {} documents for '{}' with {} encoder",
            metadata.len(),
            category,
            encoder.name()
        );
        let index = CategoryIndex::build(
            metadata,
            NormalizationSpec::default(),
            max_features,
            encoder.as_ref(),
        )
        .map_err(|e| anyhow!("Failed to encode '{}': {}", category, e))?;
        written.extend(
            index
                .save(artifacts)
                .with_context(|| format!("Failed to write artifacts for '{}'", category))?,
        );
    }

    if written.is_empty() {
        return Err(anyhow!(
            "No metadata found under {}",
            artifacts.join("metadata").display()
        ));
    }
    Ok(written)
}

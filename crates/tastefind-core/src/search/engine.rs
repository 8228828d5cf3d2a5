//! Hybrid search engine over per-category indexes.
//!
//! A [`CategoryIndex`] bundles the three row-aligned artifacts of a category
//! (metadata, term vectors, embeddings). [`HybridSearchEngine`] owns one
//! index per loaded category plus the shared encoder, and runs the
//! fuse → relevance → combine pipeline for each request.
//!
//! All indexes are immutable after construction, so `&HybridSearchEngine`
//! can be shared freely across threads.

use super::fusion::fuse;
use super::lexical::{LexicalRanker, TermVectorIndex};
use super::relevance::RelevanceScorer;
use super::semantic::{EmbeddingMatrix, SemanticRanker};
use super::types::{Candidate, RankedList, ScoredDocument, SearchRequest, SearchResponse};
use crate::config::RankingConfig;
use crate::corpus::{Category, MetadataStore};
use crate::embedding::{EncoderHandle, QueryEncoder};
use crate::error::{ConfigError, EmbeddingError, SearchError};
use crate::text::NormalizationSpec;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Vocabulary cap used when building term-vector indexes.
pub const DEFAULT_MAX_FEATURES: usize = 5000;

/// Metadata, term-vector index and embedding matrix for one category.
///
/// Construction checks that all three have the same number of rows.
#[derive(Debug, Clone)]
pub struct CategoryIndex {
    metadata: MetadataStore,
    lexical: TermVectorIndex,
    embeddings: EmbeddingMatrix,
}

impl CategoryIndex {
    /// Bundles pre-built artifacts.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Misaligned` if the row counts differ.
    pub fn new(
        metadata: MetadataStore,
        lexical: TermVectorIndex,
        embeddings: EmbeddingMatrix,
    ) -> Result<Self, ConfigError> {
        if metadata.len() != lexical.len() || metadata.len() != embeddings.len() {
            return Err(ConfigError::Misaligned {
                category: metadata.category(),
                metadata: metadata.len(),
                lexical: lexical.len(),
                semantic: embeddings.len(),
            });
        }
        Ok(Self {
            metadata,
            lexical,
            embeddings,
        })
    }

    /// Loads the three artifacts of `category` from `artifacts_dir`.
    #[instrument(skip_all, fields(category = %category))]
    pub fn load(artifacts_dir: &Path, category: Category) -> Result<Self, ConfigError> {
        let metadata = MetadataStore::load(artifacts_dir, category)?;
        let lexical = TermVectorIndex::load(artifacts_dir, category)?;
        let embeddings = EmbeddingMatrix::load(artifacts_dir, category)?;
        Self::new(metadata, lexical, embeddings)
    }

    /// Fits the term vectors and encodes the embeddings for `metadata`.
    ///
    /// Documents are indexed by title followed by body.
    #[instrument(skip_all, fields(category = %metadata.category(), docs = metadata.len()))]
    pub fn build(
        metadata: MetadataStore,
        normalization: NormalizationSpec,
        max_features: usize,
        encoder: &dyn QueryEncoder,
    ) -> Result<Self, EmbeddingError> {
        let texts: Vec<String> = metadata.documents().iter().map(|d| d.full_text()).collect();
        let lexical = TermVectorIndex::fit(&texts, normalization, max_features);
        let embeddings = EmbeddingMatrix::encode(&texts, encoder)?;
        Ok(Self {
            metadata,
            lexical,
            embeddings,
        })
    }

    /// Writes the term-vector index and embedding matrix next to the metadata.
    pub fn save(&self, artifacts_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
        let category = self.category();
        Ok(vec![
            self.lexical.save(artifacts_dir, category)?,
            self.embeddings.save(artifacts_dir, category)?,
        ])
    }

    /// Category of this index.
    pub fn category(&self) -> Category {
        self.metadata.category()
    }

    /// Document records.
    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    /// Term-vector index.
    pub fn lexical(&self) -> &TermVectorIndex {
        &self.lexical
    }

    /// Embedding matrix.
    pub fn embeddings(&self) -> &EmbeddingMatrix {
        &self.embeddings
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    /// Returns `true` if the category has no documents.
    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }
}

/// Hybrid lexical + semantic search with relevance filtering.
///
/// # Examples
///
/// ```ignore
/// let encoder = Arc::new(EncoderHandle::bert("models/all-MiniLM-L6-v2"));
/// let engine = HybridSearchEngine::load(
///     RankingConfig::default(),
///     encoder,
///     Path::new("artifacts"),
///     &[Category::Food],
/// )?;
/// let response = engine.search(&SearchRequest::new("ayam bakar", Category::Food, 10))?;
/// ```
#[derive(Debug)]
pub struct HybridSearchEngine {
    config: RankingConfig,
    scorer: RelevanceScorer,
    encoder: Arc<EncoderHandle>,
    indexes: HashMap<Category, CategoryIndex>,
}

impl HybridSearchEngine {
    /// Creates an engine with no categories loaded.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `config` fails validation.
    pub fn new(config: RankingConfig, encoder: Arc<EncoderHandle>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            scorer: RelevanceScorer::new(&config),
            config,
            encoder,
            indexes: HashMap::new(),
        })
    }

    /// Creates an engine and loads `categories` from `artifacts_dir`.
    ///
    /// Any missing or inconsistent artifact aborts loading.
    pub fn load(
        config: RankingConfig,
        encoder: Arc<EncoderHandle>,
        artifacts_dir: &Path,
        categories: &[Category],
    ) -> Result<Self, ConfigError> {
        let mut engine = Self::new(config, encoder)?;
        for &category in categories {
            engine.insert_index(CategoryIndex::load(artifacts_dir, category)?);
        }
        info!("Search engine ready with {} categories", engine.indexes.len());
        Ok(engine)
    }

    /// Adds or replaces the index for its category.
    pub fn insert_index(&mut self, index: CategoryIndex) -> Option<CategoryIndex> {
        self.indexes.insert(index.category(), index)
    }

    /// Builder-style [`insert_index`](Self::insert_index).
    pub fn with_index(mut self, index: CategoryIndex) -> Self {
        self.insert_index(index);
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Relevance scorer built from the configuration.
    pub fn scorer(&self) -> &RelevanceScorer {
        &self.scorer
    }

    /// Shared encoder handle.
    pub fn encoder(&self) -> &EncoderHandle {
        &self.encoder
    }

    /// Loaded categories in stable order.
    pub fn categories(&self) -> Vec<Category> {
        let mut categories: Vec<Category> = self.indexes.keys().copied().collect();
        categories.sort();
        categories
    }

    /// Index for `category`.
    pub fn index(&self, category: Category) -> Result<&CategoryIndex, SearchError> {
        self.indexes
            .get(&category)
            .ok_or(SearchError::CategoryNotLoaded(category))
    }

    /// Lexical candidates for `query`.
    pub fn rank_lexical(
        &self,
        category: Category,
        query: &str,
        top_k: usize,
    ) -> Result<RankedList, SearchError> {
        let index = self.index(category)?;
        Ok(LexicalRanker::new(index.lexical(), self.config.lexical_min_score).rank(query, top_k))
    }

    /// Semantic candidates for `query`; empty when the encoder is unavailable.
    pub fn rank_semantic(
        &self,
        category: Category,
        query: &str,
        top_k: usize,
    ) -> Result<RankedList, SearchError> {
        let index = self.index(category)?;
        Ok(self.semantic_ranker(index).rank(query, top_k))
    }

    /// Runs the full hybrid pipeline for one request.
    ///
    /// # Returns
    ///
    /// Up to `request.top_k` results, best first. Exact title matches come
    /// before everything else, then combined score, then ascending id. An
    /// empty list is a normal outcome, not an error.
    ///
    /// # Errors
    ///
    /// - `SearchError::InvalidQuery` for an empty query or `top_k == 0`
    /// - `SearchError::CategoryNotLoaded` if the category has no index
    #[instrument(skip_all, fields(category = %request.category, top_k = request.top_k))]
    pub fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        request.validate()?;
        let index = self.index(request.category)?;
        let pool = self.config.candidate_pool;

        let lexical = LexicalRanker::new(index.lexical(), self.config.lexical_min_score)
            .rank(&request.query, pool);
        let (semantic, semantic_degraded) =
            match self.semantic_ranker(index).try_rank(&request.query, pool) {
                Ok(list) => (list, false),
                Err(e) => {
                    debug!("Continuing lexical-only: {}", e);
                    (Vec::new(), true)
                }
            };
        debug!(
            "Candidates: {} lexical, {} semantic",
            lexical.len(),
            semantic.len()
        );

        let profile = self.scorer.profile(&request.query);
        let mut results: Vec<ScoredDocument> = Vec::new();
        let mut rejected = 0usize;

        for fused in fuse(&lexical, &semantic) {
            let Some(document) = index.metadata().get(fused.id) else {
                warn!("Ranker returned unknown document {}, skipping", fused.id);
                continue;
            };
            let candidate = Candidate {
                id: fused.id,
                lexical_score: fused.lexical_score,
                semantic_score: fused.semantic_score,
                document,
            };

            let verdict = self.scorer.score(&profile, document);
            if verdict.rejected {
                rejected += 1;
                continue;
            }

            let base = self.config.lexical_weight * candidate.lexical_score
                + self.config.semantic_weight * candidate.semantic_score;
            let combined = base * (1.0 + verdict.score);
            results.push(ScoredDocument::new(&candidate, verdict.score, combined));
        }

        results.sort_by(|a, b| {
            b.is_exact_title_match()
                .cmp(&a.is_exact_title_match())
                .then_with(|| {
                    b.combined_score
                        .partial_cmp(&a.combined_score)
                        .unwrap_or(Ordering::Equal)
                })
                .then_with(|| a.index.cmp(&b.index))
        });
        results.truncate(request.top_k);

        info!(
            "Search returned {} results ({} candidates rejected{})",
            results.len(),
            rejected,
            if semantic_degraded {
                ", semantic degraded"
            } else {
                ""
            }
        );

        Ok(SearchResponse {
            query: request.query.clone(),
            category: request.category,
            total_results: results.len(),
            results,
            semantic_degraded,
        })
    }

    fn semantic_ranker<'a>(&'a self, index: &'a CategoryIndex) -> SemanticRanker<'a> {
        SemanticRanker::new(
            index.embeddings(),
            &self.encoder,
            self.config.semantic_min_score,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Document;
    use crate::embedding::HashingEncoder;
    use crate::search::DocId;

    fn store(docs: &[(&str, &str)]) -> MetadataStore {
        MetadataStore::from_documents(
            Category::Food,
            docs.iter()
                .map(|(t, b)| Document::new(DocId::from_index(0), Category::Food, *t, *b))
                .collect(),
        )
    }

    fn engine(docs: &[(&str, &str)], encoder: EncoderHandle) -> HybridSearchEngine {
        let hashing = HashingEncoder::new(256);
        let index =
            CategoryIndex::build(store(docs), NormalizationSpec::default(), 0, &hashing).unwrap();
        HybridSearchEngine::new(RankingConfig::default(), Arc::new(encoder))
            .unwrap()
            .with_index(index)
    }

    fn hashing_handle() -> EncoderHandle {
        EncoderHandle::ready(Arc::new(HashingEncoder::new(256)))
    }

    #[test]
    fn test_misaligned_artifacts_rejected() {
        let metadata = store(&[("a", "b"), ("c", "d")]);
        let lexical = TermVectorIndex::fit(&["a b"], NormalizationSpec::default(), 0);
        let embeddings = EmbeddingMatrix::new(1, vec![vec![1.0], vec![1.0]]).unwrap();
        assert!(matches!(
            CategoryIndex::new(metadata, lexical, embeddings),
            Err(ConfigError::Misaligned {
                metadata: 2,
                lexical: 1,
                semantic: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = RankingConfig {
            semantic_weight: 0.9,
            ..RankingConfig::default()
        };
        assert!(HybridSearchEngine::new(config, Arc::new(hashing_handle())).is_err());
    }

    #[test]
    fn test_unloaded_category() {
        let engine = engine(&[("Soto", "ayam")], hashing_handle());
        let err = engine
            .search(&SearchRequest::new("soto", Category::News, 5))
            .unwrap_err();
        assert!(matches!(err, SearchError::CategoryNotLoaded(Category::News)));
    }

    #[test]
    fn test_empty_query_rejected_before_ranking() {
        let engine = engine(&[("Soto", "ayam")], hashing_handle());
        assert!(matches!(
            engine.search(&SearchRequest::new(" ", Category::Food, 5)),
            Err(SearchError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_combined_score_formula() {
        let engine = engine(
            &[("Soto Ayam", "kunyit serai"), ("Es Teh", "teh gula")],
            hashing_handle(),
        );
        let response = engine
            .search(&SearchRequest::new("soto ayam", Category::Food, 5))
            .unwrap();

        assert_eq!(response.total_results, 1);
        let top = &response.results[0];
        assert_eq!(top.title, "Soto Ayam");
        assert_eq!(top.relevance_score, 1.0);
        let expected = (0.5 * top.lexical_score + 0.5 * top.semantic_score) * 2.0;
        assert!((top.combined_score - expected).abs() < 1e-6);
        assert!(!response.semantic_degraded);
    }

    #[test]
    fn test_degraded_semantic_is_flagged() {
        let engine = engine(
            &[("Soto Ayam", "kunyit"), ("Es Teh", "teh")],
            EncoderHandle::unavailable("offline"),
        );
        let response = engine
            .search(&SearchRequest::new("soto ayam", Category::Food, 5))
            .unwrap();
        assert!(response.semantic_degraded);
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].semantic_score, 0.0);
    }

    #[test]
    fn test_no_candidates_is_empty_success() {
        let engine = engine(&[("Soto Ayam", "kunyit")], EncoderHandle::unavailable("offline"));
        let response = engine
            .search(&SearchRequest::new("pizza", Category::Food, 5))
            .unwrap();
        assert_eq!(response.total_results, 0);
        assert!(response.results.is_empty());
    }

    #[test]
    fn test_rank_helpers() {
        let engine = engine(&[("Soto Ayam", "kunyit"), ("Es Teh", "teh")], hashing_handle());
        let lexical = engine.rank_lexical(Category::Food, "teh", 10).unwrap();
        assert_eq!(lexical[0].0, DocId::from_index(1));
        assert!(engine.rank_semantic(Category::Food, "teh", 10).is_ok());
        assert_eq!(engine.categories(), vec![Category::Food]);
    }
}

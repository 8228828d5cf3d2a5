//! Term-vector index and lexical ranker.
//!
//! The index is a sparse TF-IDF matrix: raw term counts weighted by smoothed
//! inverse document frequency, one L2-normalized row per document. Queries
//! are vectorized with the [`NormalizationSpec`] stored in the index, so
//! the query side can never drift from the corpus side.
//!
//! # Scoring
//!
//! ```text
//! idf(t)   = ln((1 + n) / (1 + df(t))) + 1
//! w(t, d)  = count(t, d) * idf(t), then L2-normalized per row
//! score(d) = q · d   (cosine, both sides unit length)
//! ```
//!
//! Query terms outside the vocabulary contribute nothing, so an
//! out-of-vocabulary query scores 0 everywhere and returns no results.

use super::types::{DocId, RankedList};
use super::select_top;
use crate::corpus::Category;
use crate::error::ConfigError;
use crate::text::NormalizationSpec;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Sparse row: `(column, weight)` pairs sorted by column.
pub type SparseVector = Vec<(u32, f32)>;

/// Fitted TF-IDF index for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermVectorIndex {
    normalization: NormalizationSpec,
    vocabulary: BTreeMap<String, u32>,
    idf: Vec<f32>,
    rows: Vec<SparseVector>,
}

impl TermVectorIndex {
    /// Fits an index over `texts`, one row per text in order.
    ///
    /// # Arguments
    ///
    /// * `texts` - Document texts, row-aligned with the metadata store
    /// * `normalization` - How text is turned into terms
    /// * `max_features` - Keep only the most frequent terms (0 = unlimited)
    #[instrument(skip_all, fields(docs = texts.len(), max_features))]
    pub fn fit<S: AsRef<str>>(
        texts: &[S],
        normalization: NormalizationSpec,
        max_features: usize,
    ) -> Self {
        let doc_terms: Vec<Vec<String>> = texts
            .iter()
            .map(|t| normalization.terms(t.as_ref()))
            .collect();

        let mut totals: HashMap<&str, usize> = HashMap::new();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for terms in &doc_terms {
            let mut seen = std::collections::HashSet::new();
            for term in terms {
                *totals.entry(term.as_str()).or_default() += 1;
                if seen.insert(term.as_str()) {
                    *doc_freq.entry(term.as_str()).or_default() += 1;
                }
            }
        }

        let mut kept: Vec<(&str, usize)> = totals.into_iter().collect();
        if max_features > 0 && kept.len() > max_features {
            kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
            kept.truncate(max_features);
        }

        let mut terms: Vec<&str> = kept.into_iter().map(|(term, _)| term).collect();
        terms.sort_unstable();

        let n = texts.len() as f32;
        let vocabulary: BTreeMap<String, u32> = terms
            .iter()
            .enumerate()
            .map(|(col, term)| (term.to_string(), col as u32))
            .collect();
        let idf: Vec<f32> = terms
            .iter()
            .map(|term| {
                let df = doc_freq.get(term).copied().unwrap_or(0) as f32;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let mut index = Self {
            normalization,
            vocabulary,
            idf,
            rows: Vec::with_capacity(doc_terms.len()),
        };
        let rows = doc_terms
            .iter()
            .map(|terms| index.weigh(terms.iter().map(String::as_str)))
            .collect();
        index.rows = rows;

        info!(
            "Fitted term-vector index: {} rows, {} terms",
            index.rows.len(),
            index.vocabulary.len()
        );
        index
    }

    /// Parses a serialized index and checks its internal consistency.
    pub fn from_json_str(json: &str, what: &str) -> Result<Self, ConfigError> {
        let index: Self = serde_json::from_str(json).map_err(|e| ConfigError::parse(what, e))?;

        if index.normalization.version != NormalizationSpec::CURRENT_VERSION {
            return Err(ConfigError::NormalizationMismatch {
                expected: NormalizationSpec::CURRENT_VERSION,
                found: index.normalization.version,
            });
        }
        if index.idf.len() != index.vocabulary.len() {
            return Err(ConfigError::parse(
                what,
                format!(
                    "idf has {} entries but vocabulary has {}",
                    index.idf.len(),
                    index.vocabulary.len()
                ),
            ));
        }
        let columns = index.idf.len() as u32;
        if let Some(col) = index
            .vocabulary
            .values()
            .chain(index.rows.iter().flatten().map(|(col, _)| col))
            .find(|col| **col >= columns)
        {
            return Err(ConfigError::parse(
                what,
                format!("column {} out of range ({} columns)", col, columns),
            ));
        }
        Ok(index)
    }

    /// Loads `lexical/<slug>.json` from an artifacts directory.
    #[instrument(skip_all, fields(category = %category))]
    pub fn load(artifacts_dir: &Path, category: Category) -> Result<Self, ConfigError> {
        let path = Self::artifact_path(artifacts_dir, category);
        if !path.exists() {
            return Err(ConfigError::MissingArtifact {
                category,
                kind: "lexical",
                path,
            });
        }
        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let index = Self::from_json_str(&raw, &path.display().to_string())?;
        info!(
            "Loaded term-vector index: {} rows, {} terms",
            index.rows.len(),
            index.vocabulary.len()
        );
        Ok(index)
    }

    /// Writes the index to `lexical/<slug>.json`, creating the directory.
    pub fn save(&self, artifacts_dir: &Path, category: Category) -> Result<PathBuf, ConfigError> {
        let path = Self::artifact_path(artifacts_dir, category);
        write_json(&path, self)?;
        Ok(path)
    }

    /// Location of the artifact for `category`.
    pub fn artifact_path(artifacts_dir: &Path, category: Category) -> PathBuf {
        artifacts_dir
            .join("lexical")
            .join(format!("{}.json", category.slug()))
    }

    /// Normalization the index was built with.
    pub fn normalization(&self) -> &NormalizationSpec {
        &self.normalization
    }

    /// Number of rows (documents).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the index has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of distinct terms.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Vectorizes a query with the stored normalization.
    pub fn transform(&self, text: &str) -> SparseVector {
        let terms = self.normalization.terms(text);
        self.weigh(terms.iter().map(String::as_str))
    }

    /// Cosine similarity between a query vector and every row.
    pub fn similarities(&self, query: &SparseVector) -> Vec<f32> {
        if query.is_empty() {
            return vec![0.0; self.rows.len()];
        }
        let lookup: HashMap<u32, f32> = query.iter().copied().collect();
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .filter_map(|(col, w)| lookup.get(col).map(|q| q * w))
                    .sum()
            })
            .collect()
    }

    /// Counts in-vocabulary terms, applies idf and L2-normalizes.
    fn weigh<'t>(&self, terms: impl Iterator<Item = &'t str>) -> SparseVector {
        let mut counts: BTreeMap<u32, f32> = BTreeMap::new();
        for term in terms {
            if let Some(&col) = self.vocabulary.get(term) {
                *counts.entry(col).or_default() += 1.0;
            }
        }

        let mut row: SparseVector = counts
            .into_iter()
            .map(|(col, count)| (col, count * self.idf[col as usize]))
            .collect();
        let norm = row.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            for (_, w) in &mut row {
                *w /= norm;
            }
        }
        row
    }
}

/// Ranks one category's documents by lexical similarity.
pub struct LexicalRanker<'a> {
    index: &'a TermVectorIndex,
    min_score: f32,
}

impl<'a> LexicalRanker<'a> {
    /// Creates a ranker over `index` that drops scores below `min_score`.
    pub fn new(index: &'a TermVectorIndex, min_score: f32) -> Self {
        Self { index, min_score }
    }

    /// Returns up to `top_k` documents with score ≥ `min_score`, best first.
    #[instrument(skip_all, fields(top_k))]
    pub fn rank(&self, query: &str, top_k: usize) -> RankedList {
        let vector = self.index.transform(query);
        if vector.is_empty() {
            debug!("Query has no in-vocabulary terms");
            return Vec::new();
        }
        let scores = self.index.similarities(&vector);
        let ranked = select_top(
            scores
                .into_iter()
                .enumerate()
                .map(|(i, s)| (DocId::from_index(i), s)),
            self.min_score,
            top_k,
        );
        debug!("Lexical ranker returned {} candidates", ranked.len());
        ranked
    }
}

pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let json = serde_json::to_string(value)
        .map_err(|e| ConfigError::parse(path.display().to_string(), e))?;
    std::fs::write(path, json).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> TermVectorIndex {
        TermVectorIndex::fit(
            &[
                "sup ayam kampung",
                "es teh manis",
                "ayam goreng tepung",
                "rendang daging sapi",
            ],
            NormalizationSpec::default(),
            0,
        )
    }

    #[test]
    fn test_rows_are_unit_length() {
        let index = corpus();
        for row in &index.rows {
            let norm: f32 = row.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_vocabulary_is_sorted_with_bigrams() {
        let index = corpus();
        assert!(index.vocabulary.contains_key("ayam goreng"));
        let cols: Vec<u32> = index.vocabulary.values().copied().collect();
        assert_eq!(cols, (0..cols.len() as u32).collect::<Vec<_>>());
    }

    #[test]
    fn test_idf_smoothing() {
        let index = corpus();
        let ayam = index.vocabulary["ayam"] as usize;
        let teh = index.vocabulary["teh"] as usize;
        // ayam appears in 2 of 4 docs, teh in 1
        assert!((index.idf[ayam] - ((5.0f32 / 3.0).ln() + 1.0)).abs() < 1e-6);
        assert!((index.idf[teh] - ((5.0f32 / 2.0).ln() + 1.0)).abs() < 1e-6);
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let index = TermVectorIndex::fit(
            &["ayam ayam sapi", "ayam ikan"],
            NormalizationSpec {
                ngram_max: 1,
                ..NormalizationSpec::default()
            },
            2,
        );
        assert_eq!(index.vocabulary_size(), 2);
        assert!(index.vocabulary.contains_key("ayam"));
        // sapi and ikan tie on count; the alphabetically first wins
        assert!(index.vocabulary.contains_key("ikan"));
    }

    #[test]
    fn test_rank_orders_by_similarity() {
        let index = corpus();
        let ranker = LexicalRanker::new(&index, 0.01);
        let results = ranker.rank("Ayam Goreng", 10);

        assert_eq!(results[0].0, DocId::from_index(2));
        assert!(results.iter().any(|(id, _)| *id == DocId::from_index(0)));
        assert!(results.windows(2).all(|w| w[0].1 >= w[1].1));
        assert!(results.iter().all(|(_, s)| *s >= 0.01));
    }

    #[test]
    fn test_out_of_vocabulary_query_is_empty() {
        let index = corpus();
        assert!(LexicalRanker::new(&index, 0.01).rank("pizza", 10).is_empty());
    }

    #[test]
    fn test_min_score_can_empty_results() {
        let index = corpus();
        assert!(LexicalRanker::new(&index, 1.01).rank("ayam", 10).is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let index = corpus();
        index.save(dir.path(), Category::Food).unwrap();
        let loaded = TermVectorIndex::load(dir.path(), Category::Food).unwrap();
        assert_eq!(loaded, index);
    }

    #[test]
    fn test_load_rejects_other_normalization_version() {
        let mut index = corpus();
        index.normalization.version = 99;
        let json = serde_json::to_string(&index).unwrap();
        let err = TermVectorIndex::from_json_str(&json, "test").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NormalizationMismatch {
                expected: 1,
                found: 99
            }
        ));
    }

    #[test]
    fn test_load_rejects_out_of_range_column() {
        let mut index = corpus();
        index.rows[0].push((10_000, 0.5));
        let json = serde_json::to_string(&index).unwrap();
        assert!(matches!(
            TermVectorIndex::from_json_str(&json, "test"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            TermVectorIndex::load(dir.path(), Category::News),
            Err(ConfigError::MissingArtifact { kind: "lexical", .. })
        ));
    }
}

//! Dense embedding matrix and semantic ranker.
//!
//! Rows are unit-normalized once at load time, so cosine similarity against a
//! normalized query is a plain dot product.

use super::lexical::write_json;
use super::select_top;
use super::types::{DocId, RankedList};
use crate::corpus::Category;
use crate::embedding::{EncoderHandle, QueryEncoder};
use crate::error::{ConfigError, EmbeddingError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Row-aligned document embeddings for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingMatrix {
    dimension: usize,
    rows: Vec<Vec<f32>>,
}

impl EmbeddingMatrix {
    /// Builds a matrix from rows, checking every row has `dimension` values.
    pub fn new(dimension: usize, rows: Vec<Vec<f32>>) -> Result<Self, ConfigError> {
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != dimension) {
            return Err(ConfigError::Invalid(format!(
                "embedding row {} has {} values, expected {}",
                i,
                row.len(),
                dimension
            )));
        }
        let rows = rows.into_iter().map(normalized).collect();
        Ok(Self { dimension, rows })
    }

    /// Encodes every text with `encoder`.
    #[instrument(skip_all, fields(docs = texts.len(), encoder = encoder.name()))]
    pub fn encode<S: AsRef<str>>(
        texts: &[S],
        encoder: &dyn QueryEncoder,
    ) -> Result<Self, EmbeddingError> {
        let rows = texts
            .iter()
            .map(|t| encoder.encode(t.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(row) = rows.iter().find(|r| r.len() != encoder.dimension()) {
            return Err(EmbeddingError::DimensionMismatch {
                expected: encoder.dimension(),
                actual: row.len(),
            });
        }
        info!("Encoded {} documents", rows.len());
        Ok(Self {
            dimension: encoder.dimension(),
            rows: rows.into_iter().map(normalized).collect(),
        })
    }

    /// Parses `{ "dimension": d, "rows": [[...], ...] }`.
    pub fn from_json_str(json: &str, what: &str) -> Result<Self, ConfigError> {
        let raw: Self = serde_json::from_str(json).map_err(|e| ConfigError::parse(what, e))?;
        Self::new(raw.dimension, raw.rows).map_err(|e| ConfigError::parse(what, e))
    }

    /// Loads `embeddings/<slug>.json` from an artifacts directory.
    #[instrument(skip_all, fields(category = %category))]
    pub fn load(artifacts_dir: &Path, category: Category) -> Result<Self, ConfigError> {
        let path = Self::artifact_path(artifacts_dir, category);
        if !path.exists() {
            return Err(ConfigError::MissingArtifact {
                category,
                kind: "embeddings",
                path,
            });
        }
        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let matrix = Self::from_json_str(&raw, &path.display().to_string())?;
        info!(
            "Loaded embedding matrix: {} rows x {} dimensions",
            matrix.rows.len(),
            matrix.dimension
        );
        Ok(matrix)
    }

    /// Writes the matrix to `embeddings/<slug>.json`, creating the directory.
    pub fn save(&self, artifacts_dir: &Path, category: Category) -> Result<PathBuf, ConfigError> {
        let path = Self::artifact_path(artifacts_dir, category);
        write_json(&path, self)?;
        Ok(path)
    }

    /// Location of the artifact for `category`.
    pub fn artifact_path(artifacts_dir: &Path, category: Category) -> PathBuf {
        artifacts_dir
            .join("embeddings")
            .join(format!("{}.json", category.slug()))
    }

    /// Embedding dimension.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of rows (documents).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the matrix has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cosine similarity between `query` and every row.
    pub fn similarities(&self, query: &[f32]) -> Result<Vec<f32>, EmbeddingError> {
        if query.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        let query = normalized(query.to_vec());
        Ok(self
            .rows
            .iter()
            .map(|row| row.iter().zip(&query).map(|(a, b)| a * b).sum())
            .collect())
    }
}

/// Ranks one category's documents by embedding similarity.
///
/// Never fails a search: if the encoder is unavailable or errors,
/// [`rank`](Self::rank) returns an empty list and the lexical side carries on.
pub struct SemanticRanker<'a> {
    matrix: &'a EmbeddingMatrix,
    encoder: &'a EncoderHandle,
    min_score: f32,
}

impl<'a> SemanticRanker<'a> {
    /// Creates a ranker over `matrix` that drops scores below `min_score`.
    pub fn new(matrix: &'a EmbeddingMatrix, encoder: &'a EncoderHandle, min_score: f32) -> Self {
        Self {
            matrix,
            encoder,
            min_score,
        }
    }

    /// Like [`rank`](Self::rank) but surfaces encoder failures.
    #[instrument(skip_all, fields(top_k))]
    pub fn try_rank(&self, query: &str, top_k: usize) -> Result<RankedList, EmbeddingError> {
        let encoder = self.encoder.get()?;
        let vector = encoder.encode(query.trim())?;
        let scores = self.matrix.similarities(&vector)?;
        let ranked = select_top(
            scores
                .into_iter()
                .enumerate()
                .map(|(i, s)| (DocId::from_index(i), s)),
            self.min_score,
            top_k,
        );
        debug!("Semantic ranker returned {} candidates", ranked.len());
        Ok(ranked)
    }

    /// Returns up to `top_k` documents with score ≥ `min_score`, best first,
    /// or an empty list when the encoder cannot run.
    pub fn rank(&self, query: &str, top_k: usize) -> RankedList {
        self.try_rank(query, top_k).unwrap_or_else(|e| {
            debug!("Semantic ranking skipped: {}", e);
            Vec::new()
        })
    }
}

fn normalized(mut v: Vec<f32>) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEncoder;
    use std::sync::Arc;

    #[test]
    fn test_similarities_are_cosine() {
        let matrix = EmbeddingMatrix::new(2, vec![vec![3.0, 0.0], vec![1.0, 1.0], vec![0.0, 0.0]])
            .unwrap();
        let sims = matrix.similarities(&[2.0, 0.0]).unwrap();
        assert!((sims[0] - 1.0).abs() < 1e-6);
        assert!((sims[1] - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
        assert_eq!(sims[2], 0.0);
    }

    #[test]
    fn test_dimension_checks() {
        assert!(EmbeddingMatrix::new(3, vec![vec![1.0, 2.0]]).is_err());
        let matrix = EmbeddingMatrix::new(2, vec![vec![1.0, 0.0]]).unwrap();
        assert!(matches!(
            matrix.similarities(&[1.0]),
            Err(EmbeddingError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_rank_with_hashing_encoder() {
        let encoder = HashingEncoder::new(512);
        let texts = ["chicken soup", "iced tea", "chicken noodle soup"];
        let matrix = EmbeddingMatrix::encode(&texts, &encoder).unwrap();
        let handle = EncoderHandle::ready(Arc::new(encoder));

        let ranked = SemanticRanker::new(&matrix, &handle, 0.25).rank("chicken soup", 10);
        assert_eq!(ranked[0].0, DocId::from_index(0));
        assert!(ranked.iter().all(|(id, _)| *id != DocId::from_index(1)));
    }

    #[test]
    fn test_unavailable_encoder_yields_empty_list() {
        let matrix = EmbeddingMatrix::new(2, vec![vec![1.0, 0.0]]).unwrap();
        let handle = EncoderHandle::unavailable("offline");
        let ranker = SemanticRanker::new(&matrix, &handle, 0.0);

        assert!(ranker.rank("anything", 5).is_empty());
        assert!(matches!(
            ranker.try_rank("anything", 5),
            Err(EmbeddingError::Unavailable(_))
        ));
    }

    #[test]
    fn test_encoder_dimension_mismatch_degrades() {
        let matrix = EmbeddingMatrix::new(4, vec![vec![1.0, 0.0, 0.0, 0.0]]).unwrap();
        let handle = EncoderHandle::ready(Arc::new(HashingEncoder::new(8)));
        assert!(SemanticRanker::new(&matrix, &handle, 0.0)
            .rank("soup", 5)
            .is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let matrix = EmbeddingMatrix::new(2, vec![vec![1.0, 0.0], vec![0.0, 2.0]]).unwrap();
        matrix.save(dir.path(), Category::Drinks).unwrap();
        assert_eq!(
            EmbeddingMatrix::load(dir.path(), Category::Drinks).unwrap(),
            matrix
        );
    }
}

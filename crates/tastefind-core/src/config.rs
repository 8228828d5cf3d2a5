//! Ranking configuration.
//!
//! Every threshold, weight and word list the engine uses lives in
//! [`RankingConfig`]. Defaults reproduce the production tuning; a TOML file
//! may override any subset of fields.
//!
//! # Usage
//!
//! ```
//! use tastefind_core::config::RankingConfig;
//!
//! let config = RankingConfig::from_toml_str("relevance_cutoff = 0.2").unwrap();
//! assert_eq!(config.relevance_cutoff, 0.2);
//! assert_eq!(config.candidate_pool, 30);
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

const WEIGHT_TOLERANCE: f32 = 1e-6;

/// Tuning values for lexical/semantic retrieval and fusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Lexical cosine scores below this are dropped
    pub lexical_min_score: f32,
    /// Semantic cosine scores below this are dropped
    pub semantic_min_score: f32,
    /// Weight of the lexical score in the combined score
    pub lexical_weight: f32,
    /// Weight of the semantic score in the combined score
    pub semantic_weight: f32,
    /// Candidates with relevance below this are removed
    pub relevance_cutoff: f32,
    /// Number of candidates fetched from each ranker before fusion
    pub candidate_pool: usize,
    /// Query tokens shorter than this are ignored by the token tiers
    pub min_query_token_len: usize,
    /// Overlap needed for the partial-match tier
    pub partial_overlap_threshold: f32,
    /// Cooking-method conflict table
    pub cooking_methods: Vec<CookingMethod>,
    /// Evaluation settings
    pub evaluation: EvaluationConfig,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            lexical_min_score: 0.01,
            semantic_min_score: 0.25,
            lexical_weight: 0.5,
            semantic_weight: 0.5,
            relevance_cutoff: 0.1,
            candidate_pool: 30,
            min_query_token_len: 3,
            partial_overlap_threshold: 0.5,
            cooking_methods: CookingMethod::defaults(),
            evaluation: EvaluationConfig::default(),
        }
    }
}

impl RankingConfig {
    /// Parses a TOML document and validates the result.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|e| ConfigError::parse("config", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                what: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// Checks ranges and cross-field consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("lexical_weight", self.lexical_weight),
            ("semantic_weight", self.semantic_weight),
            ("lexical_min_score", self.lexical_min_score),
            ("semantic_min_score", self.semantic_min_score),
            ("relevance_cutoff", self.relevance_cutoff),
            ("partial_overlap_threshold", self.partial_overlap_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        let weight_sum = self.lexical_weight + self.semantic_weight;
        if (weight_sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ConfigError::Invalid(format!(
                "lexical_weight + semantic_weight must equal 1, got {}",
                weight_sum
            )));
        }

        if self.candidate_pool == 0 {
            return Err(ConfigError::Invalid(
                "candidate_pool must be greater than 0".to_string(),
            ));
        }

        let names: HashSet<&str> = self
            .cooking_methods
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        if names.len() != self.cooking_methods.len() {
            return Err(ConfigError::Invalid(
                "cooking method names must be unique".to_string(),
            ));
        }
        for method in &self.cooking_methods {
            if method.forms.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "cooking method '{}' has no surface forms",
                    method.name
                )));
            }
            if let Some(unknown) = method
                .conflicts_with
                .iter()
                .find(|c| !names.contains(c.as_str()))
            {
                return Err(ConfigError::Invalid(format!(
                    "cooking method '{}' conflicts with unknown method '{}'",
                    method.name, unknown
                )));
            }
        }

        self.evaluation.validate()
    }
}

/// A cooking method, the words that mention it, and the methods it excludes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookingMethod {
    /// Canonical name
    pub name: String,
    /// Lowercase words that count as a mention
    pub forms: Vec<String>,
    /// Canonical names of methods that contradict this one
    pub conflicts_with: Vec<String>,
}

impl CookingMethod {
    fn new(name: &str, forms: &[&str], conflicts_with: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            forms: forms.iter().map(|f| f.to_string()).collect(),
            conflicts_with: conflicts_with.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Default table with English and Indonesian surface forms.
    ///
    /// Fried and sauteed do not exclude each other: a stir-fry matches both.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(
                "grilled",
                &["grilled", "grill", "bakar", "panggang"],
                &["fried", "boiled", "steamed", "sauteed"],
            ),
            Self::new(
                "fried",
                &["fried", "fry", "goreng"],
                &["grilled", "boiled", "steamed"],
            ),
            Self::new(
                "boiled",
                &["boiled", "boil", "rebus"],
                &["grilled", "fried", "steamed", "sauteed"],
            ),
            Self::new(
                "steamed",
                &["steamed", "steam", "kukus"],
                &["grilled", "fried", "boiled", "sauteed"],
            ),
            Self::new(
                "sauteed",
                &["sauteed", "sautéed", "saute", "sauté", "tumis"],
                &["grilled", "boiled", "steamed"],
            ),
        ]
    }
}

/// Settings for the evaluation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Number of synthetic queries in the aggregate report
    pub sample_size: usize,
    /// Ranked-list length evaluated per query
    pub top_k: usize,
    /// Shortest corpus token eligible as a synthetic query
    pub min_sample_token_len: usize,
    /// How ground truth is derived from document content
    pub ground_truth: GroundTruthPolicy,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            sample_size: 20,
            top_k: 20,
            min_sample_token_len: 4,
            ground_truth: GroundTruthPolicy::default(),
        }
    }
}

impl EvaluationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.top_k == 0 {
            return Err(ConfigError::Invalid(
                "evaluation.top_k must be greater than 0".to_string(),
            ));
        }
        if self.ground_truth.min_token_hits == 0 {
            return Err(ConfigError::Invalid(
                "evaluation.ground_truth.min_token_hits must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Content-matching rule that decides which documents are relevant to a query.
///
/// The default (one token hit in the body) is loose and inflates recall for
/// common terms; raise `min_token_hits` for a stricter judgment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundTruthPolicy {
    /// Distinct query tokens a document must contain
    pub min_token_hits: usize,
    /// Query tokens shorter than this are ignored
    pub min_token_len: usize,
    /// Whether the title counts as document content
    pub include_title: bool,
}

impl Default for GroundTruthPolicy {
    fn default() -> Self {
        Self {
            min_token_hits: 1,
            min_token_len: 3,
            include_title: false,
        }
    }
}

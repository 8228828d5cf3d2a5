use crate::corpus::{Category, Document, DocumentKind};
use crate::error::SearchError;
use serde::{Deserialize, Serialize};

/// Position of a document within its category corpus.
///
/// The same id addresses the metadata record, the term-vector row and the
/// embedding row, so it is only meaningful together with a [`Category`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(u32);

impl DocId {
    /// Creates an id from a row index.
    ///
    /// Corpora never approach `u32::MAX` rows; larger indexes saturate.
    pub fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).unwrap_or(u32::MAX))
    }

    /// Returns the row index.
    pub fn as_index(&self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for DocId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ranker output: ids with similarity scores, highest first.
pub type RankedList = Vec<(DocId, f32)>;

/// A search request as received from a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text query
    pub query: String,
    /// Corpus to search
    pub category: Category,
    /// Maximum number of results to return
    pub top_k: usize,
}

impl SearchRequest {
    /// Creates a request.
    pub fn new(query: impl Into<String>, category: Category, top_k: usize) -> Self {
        Self {
            query: query.into(),
            category,
            top_k,
        }
    }

    /// Rejects empty queries and a zero result size.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.query.trim().is_empty() {
            return Err(SearchError::InvalidQuery(
                "query must not be empty".to_string(),
            ));
        }
        if self.top_k == 0 {
            return Err(SearchError::InvalidQuery(
                "top_k must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Scores of one document present in either ranker's output.
///
/// A ranker that did not return the document contributes 0.0.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// Document id
    pub id: DocId,
    /// Lexical cosine similarity
    pub lexical_score: f32,
    /// Semantic cosine similarity
    pub semantic_score: f32,
    /// Document being scored
    pub document: &'a Document,
}

/// Outcome of the relevance cascade for one candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelevanceVerdict {
    /// Relevance in [0, 1]
    pub score: f32,
    /// Whether the candidate is removed from the results
    pub rejected: bool,
}

/// A ranked document with its individual and combined scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    /// Row index within the category corpus
    pub index: DocId,
    /// Category the document belongs to
    pub category: Category,
    /// News or recipe
    pub kind: DocumentKind,
    /// Title
    pub title: String,
    /// Searchable body text
    pub body: String,
    /// Image URL (may be empty)
    pub image_url: String,
    /// Source page URL (may be empty)
    pub link: String,
    /// Lexical cosine similarity (0.0 if the lexical ranker missed it)
    pub lexical_score: f32,
    /// Semantic cosine similarity (0.0 if the semantic ranker missed it)
    pub semantic_score: f32,
    /// Relevance from the cascade
    pub relevance_score: f32,
    /// Weighted similarity boosted by relevance
    pub combined_score: f32,
}

impl ScoredDocument {
    pub(crate) fn new(candidate: &Candidate<'_>, relevance: f32, combined: f32) -> Self {
        let doc = candidate.document;
        Self {
            index: candidate.id,
            category: doc.category,
            kind: doc.kind,
            title: doc.title.clone(),
            body: doc.body.clone(),
            image_url: doc.image_url.clone(),
            link: doc.link.clone(),
            lexical_score: candidate.lexical_score,
            semantic_score: candidate.semantic_score,
            relevance_score: relevance,
            combined_score: combined,
        }
    }

    /// Whether the query phrase appeared in the title (top relevance tier).
    ///
    /// Such results rank ahead of every other result whatever their
    /// similarity scores.
    pub fn is_exact_title_match(&self) -> bool {
        self.relevance_score >= 1.0
    }
}

/// Ordered results for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Query as received
    pub query: String,
    /// Category searched
    pub category: Category,
    /// Number of entries in `results`
    pub total_results: usize,
    /// Results, best first
    pub results: Vec<ScoredDocument>,
    /// True when the semantic ranker could not run and results are lexical-only
    pub semantic_degraded: bool,
}

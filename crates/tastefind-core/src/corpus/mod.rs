//! Read-only document corpus (metadata store).
//!
//! Each [`Category`] has one ordered list of [`Document`]s loaded once from
//! `metadata/<slug>.json`. The position of a record in that list is its
//! [`DocId`](crate::search::DocId), and the lexical index and embedding matrix
//! for the same category are row-aligned to it.
//!
//! Records are produced by an upstream scraping pipeline and are loosely
//! shaped: field names vary between sources, lists are sometimes joined with
//! `|`, and numeric fields can carry `NaN`/`Infinity`. [`sanitize`] turns all
//! of that into plain strings before anything else sees it.

mod record;
pub mod sanitize;

pub use record::{Document, DocumentKind};

use crate::error::ConfigError;
use crate::search::DocId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, instrument};

/// Fixed set of corpus partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Food recipes
    Food,
    /// Drink recipes
    Drinks,
    /// Healthy recipes
    Healthy,
    /// Culinary news articles
    News,
    /// Every source merged into one corpus
    All,
}

impl Category {
    /// Returns every category in a stable order.
    pub fn all() -> &'static [Category] {
        &[
            Category::Food,
            Category::Drinks,
            Category::Healthy,
            Category::News,
            Category::All,
        ]
    }

    /// File-name slug used for artifacts of this category.
    pub fn slug(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Drinks => "drinks",
            Category::Healthy => "healthy",
            Category::News => "news",
            Category::All => "all",
        }
    }

    /// Document kind implied by the category, if the category is homogeneous.
    ///
    /// `All` mixes news and recipes, so each record decides for itself.
    pub fn document_kind(&self) -> Option<DocumentKind> {
        match self {
            Category::Food | Category::Drinks | Category::Healthy => Some(DocumentKind::Recipe),
            Category::News => Some(DocumentKind::News),
            Category::All => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Accepts the English slugs and the Indonesian names the scraping
    /// pipeline uses ("makanan", "minuman", "sehat", "berita", "semua").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "food" | "makanan" => Ok(Category::Food),
            "drinks" | "drink" | "minuman" => Ok(Category::Drinks),
            "healthy" | "sehat" => Ok(Category::Healthy),
            "news" | "berita" => Ok(Category::News),
            "all" | "semua" => Ok(Category::All),
            other => Err(format!("unknown category '{}'", other)),
        }
    }
}

/// Ordered, immutable collection of documents for one category.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    category: Category,
    documents: Vec<Document>,
}

impl MetadataStore {
    /// Builds a store from already-constructed documents.
    ///
    /// Document ids are reassigned from list position so they always match
    /// the row order of the sibling artifacts.
    pub fn from_documents(category: Category, documents: Vec<Document>) -> Self {
        let documents = documents
            .into_iter()
            .enumerate()
            .map(|(i, mut doc)| {
                doc.id = DocId::from_index(i);
                doc.category = category;
                doc
            })
            .collect();
        Self {
            category,
            documents,
        }
    }

    /// Parses a metadata JSON array (tolerating `NaN`/`Infinity` tokens).
    pub fn from_json_str(category: Category, json: &str, what: &str) -> Result<Self, ConfigError> {
        let records = sanitize::parse_records(json).map_err(|e| ConfigError::parse(what, e))?;
        let documents = records
            .into_iter()
            .enumerate()
            .map(|(i, fields)| Document::from_fields(DocId::from_index(i), category, fields))
            .collect();
        Ok(Self {
            category,
            documents,
        })
    }

    /// Loads `metadata/<slug>.json` from an artifacts directory.
    #[instrument(skip_all, fields(category = %category))]
    pub fn load(artifacts_dir: &Path, category: Category) -> Result<Self, ConfigError> {
        let path = artifacts_dir
            .join("metadata")
            .join(format!("{}.json", category.slug()));
        if !path.exists() {
            return Err(ConfigError::MissingArtifact {
                category,
                kind: "metadata",
                path,
            });
        }
        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let store = Self::from_json_str(category, &raw, &path.display().to_string())?;
        info!("Loaded {} documents", store.len());
        Ok(store)
    }

    /// Category this store belongs to.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Looks up a document by id.
    pub fn get(&self, id: DocId) -> Option<&Document> {
        self.documents.get(id.as_index())
    }

    /// All documents in id order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns `true` if the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

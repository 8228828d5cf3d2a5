use super::Category;
use crate::search::DocId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const TITLE_KEYS: &[&str] = &["Judul", "judul", "title"];
const NEWS_BODY_KEYS: &[&str] = &["Isi Berita", "isi", "Isi", "content", "Isi_Berita"];
const RECIPE_FALLBACK_KEYS: &[&str] = &["Isi Resep", "Isi Berita", "isi", "Isi", "content"];
const DESCRIPTION_KEYS: &[&str] = &["Deskripsi", "deskripsi", "description"];
const INGREDIENT_KEYS: &[&str] = &["Bahan", "bahan", "Ingredients", "ingredients"];
const STEP_KEYS: &[&str] = &["Langkah", "langkah", "Steps", "steps"];
const IMAGE_KEYS: &[&str] = &["URL Gambar", "url_gambar", "image", "image_url"];
const LINK_KEYS: &[&str] = &["URL Link", "url_link", "url", "link"];
const TYPE_KEYS: &[&str] = &["type", "kategori", "Kategori", "category", "jenis"];

/// Whether a record is a news article or a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Article body text
    News,
    /// Ingredients and steps
    Recipe,
}

/// Immutable document record.
///
/// `body` holds the category-appropriate text: the article body for news,
/// ingredients followed by steps for recipes. Missing fields are empty
/// strings, never absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Position of the record in its category corpus
    #[serde(rename = "index")]
    pub id: DocId,
    /// Category the record was loaded from
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
}

impl Document {
    /// Creates a recipe-kind document with empty URLs. Mostly useful in tests.
    pub fn new(
        id: DocId,
        category: Category,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id,
            category,
            kind: category.document_kind().unwrap_or(DocumentKind::Recipe),
            title: title.into(),
            body: body.into(),
            image_url: String::new(),
            link: String::new(),
        }
    }

    /// Builds a document from a sanitized record.
    pub(crate) fn from_fields(id: DocId, category: Category, fields: Map<String, Value>) -> Self {
        let kind = category
            .document_kind()
            .unwrap_or_else(|| detect_kind(&fields));

        let body = match kind {
            DocumentKind::News => {
                first_text(&fields, NEWS_BODY_KEYS).unwrap_or_else(|| description(&fields))
            }
            DocumentKind::Recipe => recipe_body(&fields),
        };

        Self {
            id,
            category,
            kind,
            title: first_text(&fields, TITLE_KEYS).unwrap_or_default(),
            body,
            image_url: first_text(&fields, IMAGE_KEYS).unwrap_or_default(),
            link: first_text(&fields, LINK_KEYS).unwrap_or_default(),
        }
    }

    /// Title and body joined by a single space.
    pub fn full_text(&self) -> String {
        format!("{} {}", self.title, self.body)
    }
}

fn detect_kind(fields: &Map<String, Value>) -> DocumentKind {
    let tag = first_text(fields, TYPE_KEYS)
        .unwrap_or_default()
        .to_lowercase();
    if tag.contains("berita") || tag.contains("news") {
        DocumentKind::News
    } else {
        DocumentKind::Recipe
    }
}

fn recipe_body(fields: &Map<String, Value>) -> String {
    let ingredients = first_text(fields, INGREDIENT_KEYS).unwrap_or_default();
    let steps = first_text(fields, STEP_KEYS).unwrap_or_default();

    let body = join_items([ingredients, steps].into_iter());
    if !body.is_empty() {
        return body;
    }
    first_text(fields, RECIPE_FALLBACK_KEYS).unwrap_or_else(|| description(fields))
}

fn description(fields: &Map<String, Value>) -> String {
    first_text(fields, DESCRIPTION_KEYS).unwrap_or_default()
}

/// Returns the first non-empty field among `keys`, flattened to plain text.
fn first_text(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| fields.get(*key))
        .map(flatten)
        .find(|text| !text.is_empty())
}

/// Flattens a JSON value into plain text.
///
/// Lists, and `|`/newline/`;` separated strings (how the scrapers serialize
/// ingredient and step lists), become one sentence per item so a phrase never
/// matches across two items.
fn flatten(value: &Value) -> String {
    match value {
        Value::String(s) => join_items(s.split(['|', '\n', '\r', ';']).map(str::to_string)),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => join_items(items.iter().map(flatten)),
        Value::Null | Value::Object(_) => String::new(),
    }
}

/// Joins non-empty items, closing each unterminated one with a period.
fn join_items(items: impl Iterator<Item = String>) -> String {
    let items: Vec<String> = items
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect();
    if items.len() <= 1 {
        return items.into_iter().next().unwrap_or_default();
    }
    items
        .into_iter()
        .map(|item| {
            if item.ends_with(['.', '!', '?']) {
                item
            } else {
                format!("{}.", item)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RankingConfig;
    use crate::search::RelevanceScorer;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_recipe_body_joins_ingredients_and_steps() {
        let doc = Document::from_fields(
            DocId::from_index(0),
            Category::Food,
            fields(json!({
                "Judul": "Ayam Bakar",
                "Bahan": "1 ekor ayam | 3 siung bawang",
                "Langkah": ["Lumuri ayam", "Bakar hingga matang"],
                "URL Gambar": "https://img.example/a.jpg",
                "URL Link": "https://example/a"
            })),
        );

        assert_eq!(doc.kind, DocumentKind::Recipe);
        assert_eq!(
            doc.body,
            "1 ekor ayam. 3 siung bawang. Lumuri ayam. Bakar hingga matang."
        );
        assert_eq!(doc.image_url, "https://img.example/a.jpg");
        assert_eq!(doc.link, "https://example/a");
    }

    #[test]
    fn test_recipe_body_falls_back_to_description() {
        let doc = Document::from_fields(
            DocId::from_index(0),
            Category::Healthy,
            fields(json!({"Judul": "Salad", "Deskripsi": "Segar dan sehat"})),
        );
        assert_eq!(doc.body, "Segar dan sehat");
    }

    #[test]
    fn test_news_body() {
        let doc = Document::from_fields(
            DocId::from_index(0),
            Category::News,
            fields(json!({"Judul": "Festival Kuliner", "Isi Berita": "Ribuan pengunjung datang."})),
        );
        assert_eq!(doc.kind, DocumentKind::News);
        assert_eq!(doc.body, "Ribuan pengunjung datang.");
    }

    #[test]
    fn test_all_category_detects_kind_per_record() {
        let news = Document::from_fields(
            DocId::from_index(0),
            Category::All,
            fields(json!({"type": "berita", "judul": "Harga cabai naik", "isi": "Pasar ramai"})),
        );
        let recipe = Document::from_fields(
            DocId::from_index(1),
            Category::All,
            fields(json!({"type": "resep_makanan", "judul": "Sop", "bahan": ["wortel"]})),
        );
        assert_eq!(news.kind, DocumentKind::News);
        assert_eq!(news.body, "Pasar ramai");
        assert_eq!(recipe.kind, DocumentKind::Recipe);
        assert_eq!(recipe.body, "wortel");
    }

    #[test]
    fn test_missing_fields_are_empty_strings() {
        let doc = Document::from_fields(DocId::from_index(0), Category::Food, Map::new());
        assert_eq!(doc.title, "");
        assert_eq!(doc.body, "");
        assert_eq!(doc.image_url, "");
        assert_eq!(doc.link, "");
        assert_eq!(doc.full_text(), " ");
    }

    #[test]
    fn test_numeric_fields_are_stringified() {
        let doc = Document::from_fields(
            DocId::from_index(0),
            Category::Food,
            fields(json!({"Judul": 42, "Bahan": [1, 2]})),
        );
        assert_eq!(doc.title, "42");
        assert_eq!(doc.body, "1. 2.");
    }

    #[test]
    fn test_list_items_stay_separate_sentences() {
        let doc = Document::from_fields(
            DocId::from_index(0),
            Category::Food,
            fields(json!({
                "Judul": "Sate",
                "Bahan": ["ayam", "bakar arang"],
                "Langkah": "Tusuk daging. | Panggang"
            })),
        );
        assert_eq!(doc.body, "ayam. bakar arang. Tusuk daging. Panggang.");
        assert!(!doc.full_text().to_lowercase().contains("ayam bakar"));

        let scorer = RelevanceScorer::new(&RankingConfig::default());
        assert_eq!(scorer.score_query("ayam bakar", &doc).score, 0.7);
    }

    #[test]
    fn test_single_item_is_left_as_is() {
        let doc = Document::from_fields(
            DocId::from_index(0),
            Category::Food,
            fields(json!({"Judul": ["Soto Ayam"], "Bahan": "ayam kampung"})),
        );
        assert_eq!(doc.title, "Soto Ayam");
        assert_eq!(doc.body, "ayam kampung");
    }
}

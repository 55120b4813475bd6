//! Read models exchanged with the MicroplasticsWatch backend.
//!
//! The backend speaks camelCase JSON. Every field also accepts its
//! snake_case spelling so older endpoints decode without a second type.
//! Identifiers may arrive as strings or numbers and are normalised to
//! `String`.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ApiError;

/// Accepts `"42"` or `42` for identifier fields.
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Str(String),
        Int(i64),
    }

    Ok(match IdRepr::deserialize(deserializer)? {
        IdRepr::Str(s) => s,
        IdRepr::Int(n) => n.to_string(),
    })
}

/// A library document as served by `/api/rag-documents/public/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, alias = "file_type")]
    pub file_type: Option<String>,
    #[serde(default)]
    pub metadata: DocumentMetadata,
    #[serde(default, alias = "created_at")]
    pub created_at: Option<String>,
}

/// Free-form provenance attached to a [`Document`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Entry of the document filter pick-list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentOption {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub title: String,
}

impl From<&Document> for DocumentOption {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            title: doc.title.clone(),
        }
    }
}

/// One occurrence of the search term inside a document's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentMatch {
    pub snippet: String,
    /// 1-based viewer page holding the occurrence.
    pub page: usize,
    /// Byte offset of the occurrence in the document content.
    pub position: usize,
}

/// A document returned by the search endpoint, with its match details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDocument {
    #[serde(flatten)]
    pub document: Document,
    #[serde(
        default,
        alias = "relevance_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub relevance_score: Option<f64>,
    #[serde(default, alias = "title_match")]
    pub title_match: bool,
    #[serde(default, alias = "content_matches")]
    pub content_matches: Vec<ContentMatch>,
    #[serde(default, alias = "total_matches")]
    pub total_matches: usize,
}

impl From<Document> for SearchDocument {
    fn from(document: Document) -> Self {
        Self {
            document,
            relevance_score: None,
            title_match: false,
            content_matches: Vec::new(),
            total_matches: 0,
        }
    }
}

/// Page bookkeeping attached to every list the library shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    #[serde(alias = "total_pages")]
    pub total_pages: usize,
    #[serde(alias = "has_next")]
    pub has_next: bool,
    #[serde(alias = "has_prev")]
    pub has_prev: bool,
}

impl Pagination {
    /// Computes consistent page metadata. A zero `limit` is treated as 1.
    pub fn new(page: usize, limit: usize, total: usize) -> Self {
        let limit = limit.max(1);
        let total_pages = total.div_ceil(limit);
        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    pub fn empty(limit: usize) -> Self {
        Self::new(1, limit, 0)
    }

    /// Clamps a requested page into `[1, max(total_pages, 1)]`.
    pub fn clamp(page: usize, limit: usize, total: usize) -> usize {
        let last = total.div_ceil(limit.max(1)).max(1);
        page.clamp(1, last)
    }
}

/// Slices `items` to one page, clamping `page` into range.
pub fn paginate<T>(items: &[T], page: usize, limit: usize) -> (&[T], Pagination) {
    let limit = limit.max(1);
    let page = Pagination::clamp(page, limit, items.len());
    let start = ((page - 1) * limit).min(items.len());
    let end = (start + limit).min(items.len());
    (&items[start..end], Pagination::new(page, limit, items.len()))
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub documents: Vec<SearchDocument>,
    pub pagination: Pagination,
    #[serde(default, alias = "search_term")]
    pub search_term: String,
}

impl SearchResult {
    pub fn empty(search_term: &str, limit: usize) -> Self {
        Self {
            documents: Vec::new(),
            pagination: Pagination::empty(limit),
            search_term: search_term.to_string(),
        }
    }
}

/// Wire shapes the search endpoint has shipped over time.
///
/// Variant order matters for untagged decoding: the paginated form must be
/// tried before the bare `{documents}` wrapper.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SearchPayload {
    Paginated(SearchResult),
    LegacyWrapped { documents: Vec<SearchDocument> },
    LegacyArray(Vec<SearchDocument>),
}

impl SearchPayload {
    /// Decodes a raw response body, rejecting unknown shapes.
    pub fn decode(body: &str) -> Result<Self, ApiError> {
        let value: serde_json::Value =
            serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        serde_json::from_value(value).map_err(|_| {
            ApiError::UnexpectedShape(
                "search response is neither paginated nor a document list".to_string(),
            )
        })
    }

    /// Normalises into a [`SearchResult`]. Legacy lists are paginated
    /// locally with the page and limit that were requested.
    pub fn into_result(self, search_term: &str, page: usize, limit: usize) -> SearchResult {
        let documents = match self {
            SearchPayload::Paginated(result) => return result,
            SearchPayload::LegacyWrapped { documents } => documents,
            SearchPayload::LegacyArray(documents) => documents,
        };
        let (slice, pagination) = paginate(&documents, page, limit);
        SearchResult {
            documents: slice.to_vec(),
            pagination,
            search_term: search_term.to_string(),
        }
    }
}

/// A news story as served by `/api/story/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, alias = "ai_summary")]
    pub ai_summary: Option<String>,
    #[serde(default, alias = "image_url")]
    pub image_url: Option<String>,
    #[serde(default, alias = "source_url", alias = "url")]
    pub source_url: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default, alias = "published_at")]
    pub published_at: Option<String>,
}

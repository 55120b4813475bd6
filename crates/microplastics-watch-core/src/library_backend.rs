//! In-memory library backend for local development and tests.
//!
//! Serves a fixed corpus through [`LibraryApi`] and [`StoryApi`] and
//! computes search results the way the hosted backend does: literal,
//! case-insensitive matching on title and content, up to
//! [`MAX_MATCHES_PER_DOC`] snippets per document, and match pages derived
//! with the same word splitter the viewer paginates with.

use std::ops::Range;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::api::{LibraryApi, SearchQuery, StoryApi};
use crate::error::ApiError;
use crate::highlight::Highlighter;
use crate::models::{
    ContentMatch, Document, DocumentOption, NewsItem, Pagination, SearchDocument, SearchResult,
};
use crate::paging::DocumentPager;

/// Snippets kept per document.
pub const MAX_MATCHES_PER_DOC: usize = 3;

/// Bytes of context on each side of a match.
const SNIPPET_RADIUS: usize = 80;

/// Title hits outrank any reasonable number of body hits.
const TITLE_WEIGHT: f64 = 5.0;

/// On-disk corpus format (`mpw serve --corpus corpus.json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Corpus {
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub stories: Vec<NewsItem>,
}

impl Corpus {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LocalLibrary {
    documents: Vec<Document>,
    stories: Vec<NewsItem>,
}

impl LocalLibrary {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents,
            stories: Vec::new(),
        }
    }

    pub fn from_corpus(corpus: Corpus) -> Self {
        Self {
            documents: corpus.documents,
            stories: corpus.stories,
        }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn options(&self) -> Vec<DocumentOption> {
        self.documents.iter().map(DocumentOption::from).collect()
    }

    pub fn find(&self, id: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn find_story(&self, id: &str) -> Option<&NewsItem> {
        self.stories.iter().find(|s| s.id == id)
    }

    /// Runs one search. A blank query matches nothing.
    pub fn search_sync(&self, query: &SearchQuery) -> SearchResult {
        let limit = query.limit.max(1);
        let page = query.page.max(1);
        let Some(highlighter) = Highlighter::new(&query.q) else {
            return SearchResult::empty(&query.q, limit);
        };

        let mut hits: Vec<SearchDocument> = self
            .documents
            .iter()
            .filter(|d| query.document_ids.is_empty() || query.document_ids.contains(&d.id))
            .filter_map(|d| score_document(d, &highlighter))
            .collect();

        hits.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.document.title.cmp(&b.document.title))
                .then_with(|| a.document.id.cmp(&b.document.id))
        });

        let pagination = Pagination::new(page, limit, hits.len());
        let documents = hits
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .collect();

        SearchResult {
            documents,
            pagination,
            search_term: highlighter.term().to_string(),
        }
    }
}

fn score_document(doc: &Document, highlighter: &Highlighter) -> Option<SearchDocument> {
    let title_match = highlighter.is_match(&doc.title);
    let positions: Vec<Range<usize>> = highlighter.matches(&doc.content).collect();
    if !title_match && positions.is_empty() {
        return None;
    }

    let pager = DocumentPager::new(&doc.content);
    let content_matches = positions
        .iter()
        .take(MAX_MATCHES_PER_DOC)
        .map(|range| ContentMatch {
            snippet: snippet_around(&doc.content, range.clone()),
            page: pager.page_for_offset(range.start),
            position: range.start,
        })
        .collect();

    let total_matches = positions.len();
    let title_bonus = if title_match { TITLE_WEIGHT } else { 0.0 };

    Some(SearchDocument {
        document: doc.clone(),
        relevance_score: Some(total_matches as f64 + title_bonus),
        title_match,
        content_matches,
        total_matches,
    })
}

/// Context window around `range`, snapped to char boundaries, with `...`
/// marking truncated ends.
fn snippet_around(content: &str, range: Range<usize>) -> String {
    let mut start = range.start.saturating_sub(SNIPPET_RADIUS);
    while !content.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (range.end + SNIPPET_RADIUS).min(content.len());
    while !content.is_char_boundary(end) {
        end += 1;
    }

    let mut snippet = String::new();
    if start > 0 {
        snippet.push_str("...");
    }
    snippet.push_str(content[start..end].trim());
    if end < content.len() {
        snippet.push_str("...");
    }
    snippet
}

#[async_trait]
impl LibraryApi for LocalLibrary {
    async fn list_documents(&self) -> Result<Vec<Document>, ApiError> {
        Ok(self.documents.clone())
    }

    async fn list_document_options(&self) -> Result<Vec<DocumentOption>, ApiError> {
        Ok(self.options())
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResult, ApiError> {
        Ok(self.search_sync(query))
    }

    async fn get_document(&self, id: &str) -> Result<Document, ApiError> {
        self.find(id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("document {}", id)))
    }
}

#[async_trait]
impl StoryApi for LocalLibrary {
    async fn get_story(&self, id: &str) -> Result<NewsItem, ApiError> {
        self.find_story(id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("story {}", id)))
    }
}

//! Backend API abstraction.
//!
//! The reader flows talk to the backend only through these traits, so the
//! same controllers run against the HTTP client in the application crate
//! and against [`LocalLibrary`](crate::library_backend::LocalLibrary) in
//! tests and local development.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::ApiError;
use crate::models::{Document, DocumentOption, NewsItem, SearchResult};

/// Parameters of one `GET /api/rag-documents/public/search` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    pub q: String,
    pub page: usize,
    pub limit: usize,
    /// Restrict to these documents; empty means all.
    pub document_ids: Vec<String>,
}

impl SearchQuery {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            page: 1,
            limit: 10,
            document_ids: Vec::new(),
        }
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn document_ids(mut self, ids: Vec<String>) -> Self {
        self.document_ids = ids;
        self
    }
}

/// Public research-library endpoints.
#[async_trait]
pub trait LibraryApi: Send + Sync {
    /// `GET /api/rag-documents/public`
    async fn list_documents(&self) -> Result<Vec<Document>, ApiError>;

    /// `GET /api/rag-documents/public/list`
    async fn list_document_options(&self) -> Result<Vec<DocumentOption>, ApiError>;

    /// `GET /api/rag-documents/public/search`
    async fn search(&self, query: &SearchQuery) -> Result<SearchResult, ApiError>;

    /// `GET /api/rag-documents/public/{id}`
    async fn get_document(&self, id: &str) -> Result<Document, ApiError>;
}

/// News story lookup used by the social preview.
#[async_trait]
pub trait StoryApi: Send + Sync {
    /// `GET /api/story/{id}`
    async fn get_story(&self, id: &str) -> Result<NewsItem, ApiError>;
}

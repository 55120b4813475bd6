//! HTTP client for the MicroplasticsWatch backend.
//!
//! Implements [`LibraryApi`] and [`StoryApi`] over `reqwest`. Response
//! bodies are decoded at this boundary into the core read models; any shape
//! the client does not recognise becomes [`ApiError::UnexpectedShape`]
//! instead of flowing further as loosely typed JSON.
//!
//! # Endpoints
//!
//! | Method | Path | Decoded as |
//! |--------|------|------------|
//! | `GET` | `/api/rag-documents/public` | `Vec<Document>` |
//! | `GET` | `/api/rag-documents/public/list` | `Vec<DocumentOption>` |
//! | `GET` | `/api/rag-documents/public/search` | [`SearchPayload`] → `SearchResult` |
//! | `GET` | `/api/rag-documents/public/{id}` | `Document` |
//! | `GET` | `/api/story/{id}` | `NewsItem` |

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use microplastics_watch_core::api::{LibraryApi, SearchQuery, StoryApi};
use microplastics_watch_core::error::ApiError;
use microplastics_watch_core::models::{
    Document, DocumentOption, NewsItem, SearchPayload, SearchResult,
};
use microplastics_watch_core::session::{Session, SessionStore};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::ApiConfig;

/// Environment variable holding a bearer token for the backend.
pub const API_TOKEN_ENV: &str = "MPW_API_TOKEN";

/// Path of the public library endpoints, below the API base URL.
const LIBRARY_PATH: [&str; 3] = ["api", "rag-documents", "public"];

/// `{ "documents": [...] }` or a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListEnvelope<T> {
    Wrapped { documents: Vec<T> },
    Bare(Vec<T>),
}

impl<T> ListEnvelope<T> {
    fn into_inner(self) -> Vec<T> {
        match self {
            ListEnvelope::Wrapped { documents } => documents,
            ListEnvelope::Bare(items) => items,
        }
    }
}

/// `{ "document": {...} }` or the document itself.
#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentEnvelope {
    Wrapped { document: Document },
    Bare(Document),
}

/// `{ "story": {...} }` or the story itself.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoryEnvelope {
    Wrapped { story: NewsItem },
    Bare(NewsItem),
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: Arc<SessionStore>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("microplastics-watch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            anyhow::anyhow!("Invalid api.base_url '{}': {}", config.base_url, e)
        })?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("api.base_url '{}' cannot be used as a base", config.base_url);
        }
        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL with `segments` appended, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_text(&self, url: Url) -> Result<String, ApiError> {
        let mut request = self.http.get(url.clone());
        if let Some(token) = self.session.bearer() {
            request = request.bearer_auth(token);
        }

        tracing::debug!(%url, "GET");
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(url.path().to_string()));
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let body = self.get_text(url).await?;
        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))?;
        serde_json::from_value(value).map_err(|e| ApiError::UnexpectedShape(e.to_string()))
    }

    fn library_endpoint(&self, extra: &[&str]) -> Url {
        let segments: Vec<&str> = LIBRARY_PATH.iter().chain(extra).copied().collect();
        self.endpoint(&segments)
    }
}

/// A session store seeded from `MPW_API_TOKEN`, empty when it is unset.
pub fn session_from_env() -> Arc<SessionStore> {
    session_from_token(std::env::var(API_TOKEN_ENV).ok())
}

fn session_from_token(token: Option<String>) -> Arc<SessionStore> {
    match token.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) {
        Some(token) => Arc::new(SessionStore::with_session(Session::new(token))),
        None => Arc::new(SessionStore::new()),
    }
}

#[async_trait]
impl LibraryApi for ApiClient {
    async fn list_documents(&self) -> Result<Vec<Document>, ApiError> {
        let envelope: ListEnvelope<Document> = self.get_json(self.library_endpoint(&[])).await?;
        Ok(envelope.into_inner())
    }

    async fn list_document_options(&self) -> Result<Vec<DocumentOption>, ApiError> {
        let envelope: ListEnvelope<DocumentOption> =
            self.get_json(self.library_endpoint(&["list"])).await?;
        Ok(envelope.into_inner())
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResult, ApiError> {
        let mut url = self.library_endpoint(&["search"]);
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", &query.q);
            pairs.append_pair("page", &query.page.to_string());
            pairs.append_pair("limit", &query.limit.to_string());
            if !query.document_ids.is_empty() {
                pairs.append_pair("documentIds", &query.document_ids.join(","));
            }
        }
        let body = self.get_text(url).await?;
        Ok(SearchPayload::decode(&body)?.into_result(&query.q, query.page, query.limit))
    }

    async fn get_document(&self, id: &str) -> Result<Document, ApiError> {
        let envelope: DocumentEnvelope = self.get_json(self.library_endpoint(&[id])).await?;
        Ok(match envelope {
            DocumentEnvelope::Wrapped { document } => document,
            DocumentEnvelope::Bare(document) => document,
        })
    }
}

#[async_trait]
impl StoryApi for ApiClient {
    async fn get_story(&self, id: &str) -> Result<NewsItem, ApiError> {
        let envelope: StoryEnvelope = self.get_json(self.endpoint(&["api", "story", id])).await?;
        Ok(match envelope {
            StoryEnvelope::Wrapped { story } => story,
            StoryEnvelope::Bare(story) => story,
        })
    }
}

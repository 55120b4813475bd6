//! Preview server and local library backend.
//!
//! Serves the social preview page for news stories and, when started with a
//! corpus file, the public library API backed by [`LocalLibrary`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/story/{id}` | Open Graph / Twitter preview, then redirect |
//! | `GET`  | `/api/rag-documents/public` | All documents (corpus only) |
//! | `GET`  | `/api/rag-documents/public/list` | Filter pick-list (corpus only) |
//! | `GET`  | `/api/rag-documents/public/search` | Paginated search (corpus only) |
//! | `GET`  | `/api/rag-documents/public/{id}` | One document (corpus only) |
//! | `GET`  | `/api/story/{id}` | One story (corpus only) |
//!
//! # Error Contract
//!
//! `/story/{id}` never fails: it answers `200 text/html` with generic site
//! tags when the story cannot be fetched. The library routes answer errors
//! with:
//!
//! ```json
//! { "error": { "code": "not_found", "message": "document not found: 42" } }
//! ```
//!
//! A malformed search query string (`page=abc`) is `400` with code
//! `bad_request`.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the site's browser
//! client can call the local library routes during development.

use anyhow::Context;
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use microplastics_watch_core::api::{SearchQuery, StoryApi};
use microplastics_watch_core::library::DEFAULT_PAGE_SIZE;
use microplastics_watch_core::library_backend::{Corpus, LocalLibrary};
use microplastics_watch_core::models::{Document, DocumentOption, NewsItem, SearchResult};
use microplastics_watch_core::preview::{preview_for, SiteMeta};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::api::{session_from_env, ApiClient};
use crate::config::Config;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    site: Arc<SiteMeta>,
    /// Where `/story/{id}` looks stories up.
    stories: Arc<dyn StoryApi>,
    /// Present when a corpus is served.
    library: Option<Arc<LocalLibrary>>,
}

impl AppState {
    pub fn new(site: SiteMeta, stories: Arc<dyn StoryApi>) -> Self {
        Self {
            site: Arc::new(site),
            stories,
            library: None,
        }
    }

    /// Serves `library` on the library routes and answers story lookups
    /// from it as well.
    pub fn with_library(site: SiteMeta, library: LocalLibrary) -> Self {
        let library = Arc::new(library);
        Self {
            site: Arc::new(site),
            stories: library.clone(),
            library: Some(library),
        }
    }
}

/// Reads a corpus JSON file (`{"documents": [...], "stories": [...]}`).
pub fn load_corpus(path: &std::path::Path) -> anyhow::Result<LocalLibrary> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read corpus file: {}", path.display()))?;
    let corpus = Corpus::from_json(&json)
        .with_context(|| format!("Failed to parse corpus file: {}", path.display()))?;
    tracing::info!(
        documents = corpus.documents.len(),
        stories = corpus.stories.len(),
        "corpus loaded"
    );
    Ok(LocalLibrary::from_corpus(corpus))
}

/// Builds the router. Library routes are mounted only when the state
/// carries a corpus.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/health", get(handle_health))
        .route("/story/{id}", get(handle_story_preview));

    if state.library.is_some() {
        router = router
            .route("/api/rag-documents/public", get(handle_list_documents))
            .route("/api/rag-documents/public/list", get(handle_list_options))
            .route("/api/rag-documents/public/search", get(handle_search))
            .route("/api/rag-documents/public/{id}", get(handle_get_document))
            .route("/api/story/{id}", get(handle_get_story));
    }

    router.layer(cors).with_state(state)
}

/// Starts the HTTP server on `[server].bind`.
///
/// With a corpus (from `corpus` or `[server].corpus`) the local library is
/// served and previews read stories from it; otherwise previews read
/// stories from the configured backend.
pub async fn run_server(config: &Config, corpus: Option<&std::path::Path>) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let corpus = corpus.or(config.server.corpus.as_deref());

    let state = match corpus {
        Some(path) => {
            let library = load_corpus(path)?;
            println!(
                "Serving {} documents from {}",
                library.documents().len(),
                path.display()
            );
            AppState::with_library(config.site.clone(), library)
        }
        None => {
            let client = ApiClient::new(&config.api, session_from_env())?;
            AppState::new(config.site.clone(), Arc::new(client))
        }
    };

    let app = build_router(state);

    println!("Preview server listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"not_found"`).
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn corpus_library(state: &AppState) -> Result<&LocalLibrary, AppError> {
    state
        .library
        .as_deref()
        .ok_or_else(|| not_found("no corpus is being served"))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /story/{id} ============

/// Always 200 `text/html`; unknown stories get the generic site tags.
async fn handle_story_preview(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Html<String> {
    Html(preview_for(state.stories.as_ref(), &state.site, &id).await)
}

// ============ Library routes ============

#[derive(Serialize)]
struct DocumentsResponse<T> {
    documents: Vec<T>,
}

async fn handle_list_documents(
    State(state): State<AppState>,
) -> Result<Json<DocumentsResponse<Document>>, AppError> {
    let library = corpus_library(&state)?;
    Ok(Json(DocumentsResponse {
        documents: library.documents().to_vec(),
    }))
}

async fn handle_list_options(
    State(state): State<AppState>,
) -> Result<Json<DocumentsResponse<DocumentOption>>, AppError> {
    let library = corpus_library(&state)?;
    Ok(Json(DocumentsResponse {
        documents: library.options(),
    }))
}

/// Query string of the search route. `documentIds` is comma separated.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchParams {
    #[serde(default)]
    q: String,
    #[serde(default)]
    page: Option<usize>,
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    document_ids: Option<String>,
}

impl SearchParams {
    fn into_query(self) -> SearchQuery {
        let ids = self
            .document_ids
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        SearchQuery::new(self.q)
            .page(self.page.unwrap_or(1).max(1))
            .limit(self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100))
            .document_ids(ids)
    }
}

async fn handle_search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResult>, AppError> {
    let Query(params) = params.map_err(|e| bad_request(e.body_text()))?;
    let library = corpus_library(&state)?;
    Ok(Json(library.search_sync(&params.into_query())))
}

async fn handle_get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Document>, AppError> {
    let library = corpus_library(&state)?;
    library
        .find(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found(format!("document not found: {}", id)))
}

async fn handle_get_story(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<NewsItem>, AppError> {
    let library = corpus_library(&state)?;
    library
        .find_story(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found(format!("story not found: {}", id)))
}

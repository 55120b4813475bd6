//! Research library: browse-all and search modes over a [`LibraryApi`].
//!
//! Browse mode fetches the full document list once and paginates it
//! locally. Search mode re-issues the search for every page change and
//! trusts the backend's pagination. A failed fetch clears the visible
//! results and leaves a message in [`ResearchLibrary::error`]; nothing is
//! retried.

use crate::api::{LibraryApi, SearchQuery};
use crate::highlight::{highlight, MarkStyle};
use crate::models::{
    paginate, ContentMatch, Document, DocumentOption, Pagination, SearchDocument,
};
use crate::viewer::ViewerRoute;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryMode {
    Browse,
    Search,
}

pub struct ResearchLibrary<'a> {
    api: &'a dyn LibraryApi,
    page_size: usize,
    mode: LibraryMode,
    all_documents: Vec<Document>,
    all_loaded: bool,
    results: Vec<SearchDocument>,
    pagination: Pagination,
    search_term: String,
    filter: Vec<String>,
    options: Vec<DocumentOption>,
    error: Option<String>,
}

impl<'a> ResearchLibrary<'a> {
    pub fn new(api: &'a dyn LibraryApi, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            api,
            page_size,
            mode: LibraryMode::Browse,
            all_documents: Vec::new(),
            all_loaded: false,
            results: Vec::new(),
            pagination: Pagination::empty(page_size),
            search_term: String::new(),
            filter: Vec::new(),
            options: Vec::new(),
            error: None,
        }
    }

    pub fn mode(&self) -> LibraryMode {
        self.mode
    }

    /// Documents on the current page.
    pub fn documents(&self) -> &[SearchDocument] {
        &self.results
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn options(&self) -> &[DocumentOption] {
        &self.options
    }

    pub fn filter(&self) -> &[String] {
        &self.filter
    }

    /// Restricts later searches to these document ids (empty = all).
    pub fn set_filter(&mut self, ids: Vec<String>) {
        self.filter = ids;
    }

    fn fail(&mut self, message: String) {
        tracing::warn!("{}", message);
        self.results.clear();
        self.pagination = Pagination::empty(self.page_size);
        self.error = Some(message);
    }

    /// Fetches the full list and shows its first page in browse mode.
    pub async fn load_all(&mut self) {
        self.mode = LibraryMode::Browse;
        self.search_term.clear();
        match self.api.list_documents().await {
            Ok(documents) => {
                self.all_documents = documents;
                self.all_loaded = true;
                self.error = None;
                self.show_browse_page(1);
            }
            Err(e) => {
                self.all_documents.clear();
                self.all_loaded = false;
                self.fail(format!("Failed to load documents: {}", e));
            }
        }
    }

    /// Fetches the document filter pick-list.
    pub async fn load_options(&mut self) {
        match self.api.list_document_options().await {
            Ok(options) => self.options = options,
            Err(e) => {
                tracing::warn!("failed to load document list: {}", e);
                self.options.clear();
            }
        }
    }

    fn show_browse_page(&mut self, page: usize) {
        let (slice, pagination) = paginate(&self.all_documents, page, self.page_size);
        self.results = slice.iter().cloned().map(SearchDocument::from).collect();
        self.pagination = pagination;
    }

    /// Submits the search box. A blank query returns to browse mode.
    pub async fn submit(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            if self.all_loaded {
                self.mode = LibraryMode::Browse;
                self.search_term.clear();
                self.error = None;
                self.show_browse_page(1);
            } else {
                self.load_all().await;
            }
            return;
        }
        self.mode = LibraryMode::Search;
        self.search_term = query.to_string();
        self.run_search(1).await;
    }

    pub async fn go_to_page(&mut self, page: usize) {
        match self.mode {
            LibraryMode::Search => self.run_search(page.max(1)).await,
            LibraryMode::Browse => self.show_browse_page(page),
        }
    }

    async fn run_search(&mut self, page: usize) {
        let query = SearchQuery::new(self.search_term.clone())
            .page(page)
            .limit(self.page_size)
            .document_ids(self.filter.clone());
        tracing::debug!(q = %query.q, page = query.page, "searching library");
        match self.api.search(&query).await {
            Ok(result) => {
                self.results = result.documents;
                self.pagination = result.pagination;
                self.error = None;
            }
            Err(e) => self.fail(format!("Search failed: {}", e)),
        }
    }

    /// "View Document" links, one per content match.
    pub fn snippet_links(&self, doc: &SearchDocument) -> Vec<ViewerRoute> {
        doc.content_matches
            .iter()
            .map(|m| ViewerRoute {
                document_id: doc.document.id.clone(),
                highlight: Some(self.search_term.clone()).filter(|t| !t.is_empty()),
                page: m.page,
            })
            .collect()
    }

    /// Title, highlighted only when the backend reported a title match.
    pub fn render_title(&self, doc: &SearchDocument, style: MarkStyle) -> String {
        let term = (self.mode == LibraryMode::Search && doc.title_match)
            .then_some(self.search_term.as_str());
        highlight(&doc.document.title, term, style)
    }

    pub fn render_snippet(&self, m: &ContentMatch, style: MarkStyle) -> String {
        highlight(&m.snippet, Some(&self.search_term), style)
    }
}

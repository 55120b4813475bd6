//! Document viewer: deep links, loading, and per-page highlighting.
//!
//! A [`ViewerRoute`] is the "View Document" deep link produced from a search
//! snippet. Opening it fetches the full document and shows the requested
//! page of [`WORDS_PER_PAGE`](crate::paging::WORDS_PER_PAGE) words.
//!
//! Highlighting applies to the current page's slice only. A match that sits
//! on another page is not shown, even when the link's page number came from
//! a match the backend computed.

use std::ops::Range;

use serde::Serialize;
use url::Url;

use crate::api::LibraryApi;
use crate::error::RouteError;
use crate::highlight::{highlight, Highlighter, MarkStyle};
use crate::models::Document;
use crate::paging::DocumentPager;

/// Path segment the viewer lives under.
pub const LIBRARY_SEGMENT: &str = "research-library";

/// Where "not found" sends the reader back to.
pub const LIBRARY_PATH: &str = "/research-library";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewerRoute {
    pub document_id: String,
    pub highlight: Option<String>,
    pub page: usize,
}

fn link_base() -> Url {
    Url::parse("http://localhost/").expect("static base url is valid")
}

impl ViewerRoute {
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            highlight: None,
            page: 1,
        }
    }

    pub fn with_highlight(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.highlight = Some(term).filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }

    /// `/research-library/{id}?highlight={term}&page={n}`
    pub fn to_path(&self) -> String {
        let mut url = link_base();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.clear().push(LIBRARY_SEGMENT).push(&self.document_id);
        }
        {
            let mut query = url.query_pairs_mut();
            if let Some(term) = &self.highlight {
                query.append_pair("highlight", term);
            }
            query.append_pair("page", &self.page.to_string());
        }
        match url.query() {
            Some(q) => format!("{}?{}", url.path(), q),
            None => url.path().to_string(),
        }
    }

    /// Parses a path (`/research-library/abc?page=2`) or a full URL. Missing
    /// or unparsable page numbers become 1.
    pub fn parse(link: &str) -> Result<Self, RouteError> {
        let url = Url::parse(link)
            .or_else(|_| link_base().join(link))
            .map_err(|e| RouteError::Invalid(e.to_string()))?;

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();
        let id_index = segments
            .iter()
            .position(|s| *s == LIBRARY_SEGMENT)
            .map(|i| i + 1)
            .ok_or(RouteError::MissingDocument)?;
        let raw_id = segments.get(id_index).ok_or(RouteError::MissingDocument)?;
        let document_id = percent_decode(raw_id);

        let mut route = ViewerRoute::new(document_id);
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "highlight" => route = route.with_highlight(value.into_owned()),
                "page" => route.page = value.parse::<usize>().unwrap_or(1).max(1),
                _ => {}
            }
        }
        Ok(route)
    }
}

/// Plain percent-decoding: `+`, `&` and `=` are literal in a path segment.
fn percent_decode(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

/// Outcome of opening a viewer link.
#[derive(Debug, Clone)]
pub enum ViewerState {
    Loaded(DocumentView),
    /// Terminal state: the document could not be shown.
    NotFound {
        message: String,
        back_link: &'static str,
    },
}

/// Fetches the routed document. Every failure ends in
/// [`ViewerState::NotFound`].
pub async fn open(api: &dyn LibraryApi, route: &ViewerRoute) -> ViewerState {
    match api.get_document(&route.document_id).await {
        Ok(document) => ViewerState::Loaded(DocumentView::new(
            document,
            route.highlight.as_deref(),
            route.page,
        )),
        Err(e) => {
            tracing::warn!(id = %route.document_id, "document unavailable: {}", e);
            let message = if e.is_not_found() {
                "Document not found".to_string()
            } else {
                format!("Document could not be loaded: {}", e)
            };
            ViewerState::NotFound {
                message,
                back_link: LIBRARY_PATH,
            }
        }
    }
}

/// A loaded document positioned on one page.
#[derive(Debug, Clone)]
pub struct DocumentView {
    document: Document,
    highlighter: Option<Highlighter>,
    page: usize,
    total_pages: usize,
    range: Range<usize>,
}

impl DocumentView {
    pub fn new(document: Document, highlight: Option<&str>, page: usize) -> Self {
        let total_pages = DocumentPager::new(&document.content).total_pages();
        let mut view = Self {
            document,
            highlighter: highlight.and_then(Highlighter::new),
            page: 1,
            total_pages,
            range: 0..0,
        };
        view.go_to(page);
        view
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn highlight_term(&self) -> Option<&str> {
        self.highlighter.as_ref().map(Highlighter::term)
    }

    /// Moves to `page`, clamped into range; returns the page shown.
    pub fn go_to(&mut self, page: usize) -> usize {
        let pager = DocumentPager::new(&self.document.content);
        self.page = pager.clamp_page(page);
        self.range = pager.page_range(self.page);
        self.page
    }

    pub fn next_page(&mut self) -> usize {
        self.go_to(self.page + 1)
    }

    pub fn previous_page(&mut self) -> usize {
        self.go_to(self.page.saturating_sub(1))
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Raw text of the current page.
    pub fn page_text(&self) -> &str {
        &self.document.content[self.range.clone()]
    }

    pub fn render_page(&self, style: MarkStyle) -> String {
        highlight(self.page_text(), self.highlight_term(), style)
    }

    /// Range of the first highlighted occurrence within [`page_text`].
    ///
    /// [`page_text`]: DocumentView::page_text
    pub fn scroll_target(&self) -> Option<Range<usize>> {
        self.highlighter
            .as_ref()
            .and_then(|h| h.first_match(self.page_text()))
    }

    /// Link to the current page, keeping the highlight term.
    pub fn route(&self) -> ViewerRoute {
        let mut route = ViewerRoute::new(self.document.id.clone()).with_page(self.page);
        route.highlight = self.highlight_term().map(str::to_string);
        route
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library_backend::LocalLibrary;
    use crate::models::DocumentMetadata;

    fn doc(id: &str, content: String) -> Document {
        Document {
            id: id.to_string(),
            title: "Doc".to_string(),
            content,
            file_type: None,
            metadata: DocumentMetadata::default(),
            created_at: None,
        }
    }

    /// 5000 words; "plastic" is word 1100 (page 3) only.
    fn ten_page_content() -> String {
        (0..5000)
            .map(|i| if i == 1100 { "Plastic".to_string() } else { format!("w{}", i) })
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_route_round_trip() {
        let route = ViewerRoute::new("doc 42/a")
            .with_highlight("micro & nano")
            .with_page(3);
        let path = route.to_path();
        assert!(path.starts_with("/research-library/doc%2042%2Fa?"));
        assert_eq!(ViewerRoute::parse(&path).unwrap(), route);
    }

    #[test]
    fn test_route_round_trip_reserved_characters() {
        for id in ["R&D-2024", "a=b", "c+d", "R&D=1+2 x"] {
            let route = ViewerRoute::new(id).with_page(2);
            let parsed = ViewerRoute::parse(&route.to_path()).unwrap();
            assert_eq!(parsed, route, "id {:?} via {}", id, route.to_path());
        }
        assert_eq!(
            ViewerRoute::parse("/research-library/R%26D%2B1").unwrap().document_id,
            "R&D+1"
        );
    }

    #[test]
    fn test_parse_defaults() {
        let route = ViewerRoute::parse("/research-library/abc").unwrap();
        assert_eq!(route, ViewerRoute::new("abc"));

        let route = ViewerRoute::parse("https://microplasticswatch.com/research-library/abc?page=zero&highlight=")
            .unwrap();
        assert_eq!(route.page, 1);
        assert_eq!(route.highlight, None);
    }

    #[test]
    fn test_parse_rejects_missing_document() {
        assert_eq!(
            ViewerRoute::parse("/research-library/").unwrap_err(),
            RouteError::MissingDocument
        );
        assert_eq!(
            ViewerRoute::parse("/news/1").unwrap_err(),
            RouteError::MissingDocument
        );
    }

    #[test]
    fn test_view_shows_requested_page_with_highlight() {
        let view = DocumentView::new(doc("d", ten_page_content()), Some("plastic"), 3);
        assert_eq!(view.total_pages(), 10);
        assert_eq!(view.page(), 3);

        let words: Vec<&str> = view.page_text().split_whitespace().collect();
        assert_eq!(words.len(), 500);
        assert_eq!(words[0], "w1000");

        let html = view.render_page(MarkStyle::Html);
        assert!(html.contains("<mark>Plastic</mark>"));
        assert!(view.scroll_target().is_some());
    }

    #[test]
    fn test_highlight_invisible_on_other_pages() {
        let mut view = DocumentView::new(doc("d", ten_page_content()), Some("plastic"), 4);
        assert!(!view.render_page(MarkStyle::Html).contains("<mark>"));
        assert!(view.scroll_target().is_none());

        view.previous_page();
        assert_eq!(view.page(), 3);
        assert!(view.scroll_target().is_some());
    }

    #[test]
    fn test_page_is_clamped() {
        let mut view = DocumentView::new(doc("d", ten_page_content()), None, 99);
        assert_eq!(view.page(), 10);
        assert!(!view.has_next());
        assert_eq!(view.go_to(0), 1);
        assert!(!view.has_previous());
        assert_eq!(view.next_page(), 2);
    }

    #[test]
    fn test_empty_document() {
        let view = DocumentView::new(doc("e", String::new()), Some("x"), 5);
        assert_eq!(view.total_pages(), 0);
        assert_eq!(view.page(), 1);
        assert_eq!(view.page_text(), "");
    }

    #[tokio::test]
    async fn test_open_missing_document_is_terminal() {
        let api = LocalLibrary::default();
        match open(&api, &ViewerRoute::new("missing")).await {
            ViewerState::NotFound { message, back_link } => {
                assert_eq!(message, "Document not found");
                assert_eq!(back_link, LIBRARY_PATH);
            }
            ViewerState::Loaded(_) => panic!("expected not found"),
        }
    }

    #[tokio::test]
    async fn test_open_loads_and_positions() {
        let api = LocalLibrary::new(vec![doc("d", ten_page_content())]);
        let route = ViewerRoute::new("d").with_highlight("plastic").with_page(3);
        match open(&api, &route).await {
            ViewerState::Loaded(view) => {
                assert_eq!(view.page(), 3);
                assert_eq!(view.route(), route);
            }
            ViewerState::NotFound { message, .. } => panic!("unexpected: {}", message),
        }
    }
}

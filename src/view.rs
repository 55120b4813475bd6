//! `mpw view` and `mpw open`: the document viewer on the command line.
//!
//! Prints one 500-word page of a document with the search term highlighted,
//! and reports where the first highlighted occurrence sits on that page.

use anyhow::{bail, Context, Result};
use microplastics_watch_core::api::LibraryApi;
use microplastics_watch_core::highlight::MarkStyle;
use microplastics_watch_core::viewer::{self, DocumentView, ViewerRoute, ViewerState};
use std::fmt::Write;

use crate::output::mark_style;

/// Opens a document by id.
pub async fn run_view(
    api: &dyn LibraryApi,
    id: &str,
    highlight: Option<String>,
    page: usize,
) -> Result<()> {
    let mut route = ViewerRoute::new(id).with_page(page);
    if let Some(term) = highlight {
        route = route.with_highlight(term);
    }
    show(api, &route).await
}

/// Opens a viewer deep link such as
/// `/research-library/42?highlight=nanoplastics&page=3`.
pub async fn run_open(api: &dyn LibraryApi, link: &str) -> Result<()> {
    let route =
        ViewerRoute::parse(link).with_context(|| format!("Not a document link: {}", link))?;
    show(api, &route).await
}

async fn show(api: &dyn LibraryApi, route: &ViewerRoute) -> Result<()> {
    match viewer::open(api, route).await {
        ViewerState::Loaded(view) => {
            if view.page() != route.page {
                eprintln!(
                    "Page {} is out of range; showing page {}.",
                    route.page,
                    view.page()
                );
            }
            print!("{}", format_view(&view, mark_style()));
            Ok(())
        }
        ViewerState::NotFound { message, back_link } => {
            bail!("{} (back to {})", message, back_link)
        }
    }
}

/// Renders the header, the current page, and the pager footer.
pub fn format_view(view: &DocumentView, style: MarkStyle) -> String {
    let doc = view.document();
    let mut out = String::new();

    let _ = writeln!(out, "--- {} ---", doc.title);
    let _ = writeln!(out, "id:      {}", doc.id);
    if let Some(ref author) = doc.metadata.author {
        let _ = writeln!(out, "author:  {}", author);
    }
    if let Some(ref date) = doc.metadata.date {
        let _ = writeln!(out, "date:    {}", date);
    }
    if let Some(ref source) = doc.metadata.source {
        let _ = writeln!(out, "source:  {}", source);
    }
    if let Some(term) = view.highlight_term() {
        match view.scroll_target() {
            Some(range) => {
                let _ = writeln!(
                    out,
                    "highlight: \"{}\" (first match at byte {} of this page)",
                    term, range.start
                );
            }
            None => {
                let _ = writeln!(out, "highlight: \"{}\" (no match on this page)", term);
            }
        }
    }
    out.push('\n');

    if view.total_pages() == 0 {
        let _ = writeln!(out, "(empty document)");
        return out;
    }

    let _ = writeln!(out, "{}", view.render_page(style));
    out.push('\n');

    let mut footer = format!("page {} of {}", view.page(), view.total_pages());
    if view.has_previous() {
        let prev = view.route().with_page(view.page() - 1);
        let _ = write!(footer, "  prev: {}", prev.to_path());
    }
    if view.has_next() {
        let next = view.route().with_page(view.page() + 1);
        let _ = write!(footer, "  next: {}", next.to_path());
    }
    let _ = writeln!(out, "{}", footer);
    out
}

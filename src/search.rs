//! `mpw docs` and `mpw search`: the research library on the command line.
//!
//! Both commands drive a [`ResearchLibrary`] against the configured backend
//! and print one page of results. Search results carry their highlighted
//! snippets and a viewer link per snippet, ready for `mpw open`.

use anyhow::{bail, Result};
use microplastics_watch_core::api::LibraryApi;
use microplastics_watch_core::highlight::MarkStyle;
use microplastics_watch_core::library::{LibraryMode, ResearchLibrary};
use std::fmt::Write;

use crate::config::Config;
use crate::output::{mark_style, page_summary};

/// Lists all documents, one page at a time.
pub async fn run_docs(config: &Config, api: &dyn LibraryApi, page: usize) -> Result<()> {
    let mut library = ResearchLibrary::new(api, config.library.page_size);
    library.load_all().await;
    if let Some(err) = library.error() {
        bail!("{}", err);
    }
    if page > 1 {
        library.go_to_page(page).await;
    }
    print!("{}", format_library(&library, mark_style()));
    Ok(())
}

/// Runs one search. A blank query falls back to the document list, the
/// same as clearing the search box.
pub async fn run_search(
    config: &Config,
    api: &dyn LibraryApi,
    query: &str,
    page: usize,
    limit: Option<usize>,
    document_ids: Vec<String>,
) -> Result<()> {
    let page_size = limit.unwrap_or(config.library.page_size);
    let mut library = ResearchLibrary::new(api, page_size);
    library.set_filter(document_ids);
    library.submit(query).await;
    if page > 1 && library.error().is_none() {
        library.go_to_page(page).await;
    }
    if let Some(err) = library.error() {
        bail!("{}", err);
    }
    print!("{}", format_library(&library, mark_style()));
    Ok(())
}

/// Renders the library's current page.
pub fn format_library(library: &ResearchLibrary<'_>, style: MarkStyle) -> String {
    let mut out = String::new();
    let pagination = library.pagination();
    let searching = library.mode() == LibraryMode::Search;

    if library.documents().is_empty() {
        if searching {
            let _ = writeln!(out, "No results for \"{}\".", library.search_term());
        } else {
            let _ = writeln!(out, "No documents.");
        }
        return out;
    }

    let noun = if searching { "results" } else { "documents" };
    if searching {
        let _ = writeln!(out, "Search results for \"{}\":", library.search_term());
    }

    for (i, doc) in library.documents().iter().enumerate() {
        let rank = (pagination.page - 1) * pagination.limit + i + 1;
        let _ = writeln!(
            out,
            "{}. [{}] {}",
            rank,
            doc.document.id,
            library.render_title(doc, style)
        );

        let meta = &doc.document.metadata;
        let byline: Vec<&str> = [meta.author.as_deref(), meta.date.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if !byline.is_empty() {
            let _ = writeln!(out, "    {}", byline.join(", "));
        }

        if searching {
            if doc.total_matches > 0 {
                let _ = writeln!(out, "    matches: {}", doc.total_matches);
            }
            let links = library.snippet_links(doc);
            for (m, link) in doc.content_matches.iter().zip(links) {
                let _ = writeln!(out, "    > {}", library.render_snippet(m, style));
                let _ = writeln!(out, "      page {}: {}", m.page, link.to_path());
            }
        }
        out.push('\n');
    }

    let _ = writeln!(
        out,
        "{}",
        page_summary(pagination.page, pagination.total_pages, pagination.total, noun)
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use microplastics_watch_core::library_backend::LocalLibrary;
    use microplastics_watch_core::models::Document;

    fn doc(id: &str, title: &str, content: &str) -> Document {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": title,
            "content": content,
            "metadata": { "author": "Rivera" }
        }))
        .unwrap()
    }

    fn corpus() -> LocalLibrary {
        LocalLibrary::new(vec![
            doc("1", "Microplastic survey", "Sediment held microplastic fibres."),
            doc("2", "Soil carbon", "Nothing relevant here."),
            doc("3", "Ocean sampling", "Each microplastic particle was counted."),
        ])
    }

    #[tokio::test]
    async fn test_format_search_results() {
        let api = corpus();
        let mut library = ResearchLibrary::new(&api, 10);
        library.submit("microplastic").await;
        let text = format_library(&library, MarkStyle::Markdown);

        assert!(text.starts_with("Search results for \"microplastic\":"));
        assert!(text.contains("[1] **Microplastic** survey"));
        assert!(text.contains("[3] Ocean sampling"));
        assert!(!text.contains("Soil carbon"));
        assert!(text.contains("/research-library/1?highlight=microplastic&page=1"));
        assert!(text.ends_with("page 1 of 1 (2 results)\n"));
    }

    #[tokio::test]
    async fn test_format_browse_list() {
        let api = corpus();
        let mut library = ResearchLibrary::new(&api, 2);
        library.load_all().await;
        library.go_to_page(2).await;
        let text = format_library(&library, MarkStyle::Markdown);

        assert!(text.contains("3. [3] Ocean sampling"));
        assert!(text.contains("    Rivera"));
        assert!(!text.contains("**"));
        assert!(text.ends_with("page 2 of 2 (3 documents)\n"));
    }

    #[tokio::test]
    async fn test_format_no_results() {
        let api = corpus();
        let mut library = ResearchLibrary::new(&api, 10);
        library.submit("glacier").await;
        assert_eq!(
            format_library(&library, MarkStyle::Markdown),
            "No results for \"glacier\".\n"
        );
    }
}

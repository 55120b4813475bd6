//! Terminal output helpers shared by the CLI commands.

use microplastics_watch_core::highlight::MarkStyle;

/// Reverse video on a terminal, `**bold**` when stdout is piped.
pub fn mark_style() -> MarkStyle {
    if atty::is(atty::Stream::Stdout) {
        MarkStyle::Terminal
    } else {
        MarkStyle::Markdown
    }
}

/// `"page 2 of 5 (47 documents)"`, or `"no pages"` for an empty list.
pub fn page_summary(page: usize, total_pages: usize, total: usize, noun: &str) -> String {
    if total_pages == 0 {
        return format!("no {}", noun);
    }
    format!("page {} of {} ({} {})", page, total_pages, total, noun)
}

//! Whitepaper chapters over HTTP and the `mpw whitepaper` command.
//!
//! Chapter files are static markdown published next to the site. Each fetch
//! carries a `?v={unix millis}` query so intermediate caches always hand out
//! the current revision.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use microplastics_watch_core::chapter::{ChapterNavigator, HistorySink, RecordingHistory};
use microplastics_watch_core::whitepaper::{load_chapters, ChapterSource, LoadReport};
use reqwest::Url;
use std::fmt::Write;
use std::time::Duration;

use crate::config::Config;

/// Fetches `{base_url}/{file}?v={millis}`.
#[derive(Debug, Clone)]
pub struct HttpChapterSource {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpChapterSource {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid whitepaper.base_url '{}'", base_url))?;
        if base_url.cannot_be_a_base() {
            bail!("whitepaper.base_url '{}' cannot be used as a base", base_url);
        }
        Ok(Self { http, base_url })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.whitepaper.base_url, config.api.timeout_secs)
    }

    fn chapter_url(&self, file_name: &str, version: i64) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push(file_name);
        }
        url.query_pairs_mut()
            .append_pair("v", &version.to_string());
        url
    }
}

#[async_trait]
impl ChapterSource for HttpChapterSource {
    async fn fetch(&self, file_name: &str) -> Result<String> {
        let url = self.chapter_url(file_name, chrono::Utc::now().timestamp_millis());
        tracing::debug!(%url, "fetching chapter");

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            bail!("{} returned {}", file_name, status);
        }

        Ok(response.text().await?)
    }
}

/// Loads every chapter and prints the table of contents and the chapter
/// selected by `chapter` (or the first one).
pub async fn run_whitepaper(config: &Config, chapter: Option<&str>) -> Result<()> {
    let source = HttpChapterSource::from_config(config)?;
    let report = load_chapters(&source, &config.whitepaper.chapters).await?;

    for (file, err) in &report.failed {
        eprintln!("Warning: chapter {} could not be loaded: {}", file, err);
    }

    let mut navigator = ChapterNavigator::new(report.chapters.clone(), RecordingHistory::new());
    let shown = navigator.initialize(chapter).map(|c| c.id.clone());
    if let Some(slug) = chapter {
        if shown.as_deref() != Some(slug.trim_start_matches('#')) {
            eprintln!("Unknown chapter '{}'; showing the first chapter.", slug);
        }
    }

    print!("{}", format_whitepaper(&navigator, &report));
    Ok(())
}

/// Table of contents with the active chapter marked, then its text and
/// the neighbouring chapters.
pub fn format_whitepaper<H: HistorySink>(
    navigator: &ChapterNavigator<H>,
    report: &LoadReport,
) -> String {
    let mut out = String::new();
    let active = navigator.active().map(|c| c.id.as_str());

    let _ = writeln!(out, "Contents");
    for chapter in navigator.chapters() {
        let marker = if Some(chapter.id.as_str()) == active {
            ">"
        } else {
            " "
        };
        let unavailable = report.failed.iter().any(|(f, _)| *f == chapter.file_name);
        let _ = writeln!(
            out,
            "{} {:<40} #{}{}",
            marker,
            chapter.title,
            chapter.id,
            if unavailable { "  (unavailable)" } else { "" }
        );
    }
    out.push('\n');

    let Some(chapter) = navigator.active() else {
        return out;
    };

    if chapter.content.trim().is_empty() {
        let _ = writeln!(out, "(this chapter could not be loaded)");
    } else {
        let _ = writeln!(out, "{}", chapter.content.trim_end());
    }
    out.push('\n');

    if let Some(prev) = navigator.previous() {
        let _ = writeln!(out, "previous: {} (#{})", prev.title, prev.id);
    }
    if let Some(next) = navigator.next() {
        let _ = writeln!(out, "next:     {} (#{})", next.title, next.id);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use microplastics_watch_core::chapter::Chapter;

    #[test]
    fn test_chapter_url_cache_busting() {
        let source = HttpChapterSource::new("https://mw.example.org/whitepaper/", 5).unwrap();
        assert_eq!(
            source.chapter_url("01-Executive-Summary.md", 1700000000123).as_str(),
            "https://mw.example.org/whitepaper/01-Executive-Summary.md?v=1700000000123"
        );
    }

    #[test]
    fn test_chapter_url_without_trailing_slash() {
        let source = HttpChapterSource::new("https://mw.example.org/wp", 5).unwrap();
        assert_eq!(
            source.chapter_url("a b.md", 1).as_str(),
            "https://mw.example.org/wp/a%20b.md?v=1"
        );
    }

    #[test]
    fn test_format_marks_active_and_unavailable() {
        let chapters = Chapter::build_all(vec![
            ("01-Intro.md".to_string(), "# Intro\nHello.".to_string()),
            ("02-Methods.md".to_string(), String::new()),
            ("03-Results.md".to_string(), "# Results".to_string()),
        ]);
        let report = LoadReport {
            chapters: chapters.clone(),
            failed: vec![("02-Methods.md".to_string(), "404".to_string())],
        };
        let mut nav = ChapterNavigator::new(chapters, RecordingHistory::new());
        nav.initialize(Some("#01-intro"));
        nav.select("01-intro").unwrap();

        let text = format_whitepaper(&nav, &report);
        assert!(text.contains("> 01 Intro"));
        assert!(text.contains("#02-methods  (unavailable)"));
        assert!(text.contains("# Intro\nHello."));
        assert!(text.contains("next:     02 Methods (#02-methods)"));
        assert!(!text.contains("previous:"));
    }

    #[test]
    fn test_format_unloaded_chapter() {
        let chapters = Chapter::build_all(vec![
            ("01-Intro.md".to_string(), "x".to_string()),
            ("02-Methods.md".to_string(), String::new()),
        ]);
        let report = LoadReport {
            chapters: chapters.clone(),
            failed: vec![("02-Methods.md".to_string(), "timeout".to_string())],
        };
        let mut nav = ChapterNavigator::new(chapters, RecordingHistory::new());
        nav.initialize(None);
        nav.select("02-methods").unwrap();

        let text = format_whitepaper(&nav, &report);
        assert!(text.contains("(this chapter could not be loaded)"));
        assert!(text.contains("previous: 01 Intro (#01-intro)"));
    }
}

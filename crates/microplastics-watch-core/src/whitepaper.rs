//! Whitepaper loading: fetch every chapter file concurrently, tolerate
//! individual failures.

use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;

use crate::chapter::Chapter;
use crate::error::WhitepaperError;

/// Source of raw chapter markdown, addressed by file name.
#[async_trait]
pub trait ChapterSource: Send + Sync {
    async fn fetch(&self, file_name: &str) -> Result<String>;
}

/// Loaded chapters plus the files that degraded to empty content.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub chapters: Vec<Chapter>,
    pub failed: Vec<(String, String)>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Fetches all `files` at once and builds chapters in list order.
///
/// A chapter whose fetch fails keeps its place with empty content. Only
/// when every fetch fails does the load itself fail.
pub async fn load_chapters(
    source: &dyn ChapterSource,
    files: &[String],
) -> Result<LoadReport, WhitepaperError> {
    if files.is_empty() {
        return Err(WhitepaperError::NoChapters);
    }

    let fetched = join_all(files.iter().map(|f| source.fetch(f))).await;

    let mut failed = Vec::new();
    let mut contents = Vec::with_capacity(files.len());
    for (file, outcome) in files.iter().zip(fetched) {
        match outcome {
            Ok(content) => contents.push((file.clone(), content)),
            Err(e) => {
                tracing::warn!(file = %file, "chapter failed to load: {:#}", e);
                failed.push((file.clone(), format!("{:#}", e)));
                contents.push((file.clone(), String::new()));
            }
        }
    }

    if failed.len() == files.len() {
        return Err(WhitepaperError::AllChaptersFailed(files.len()));
    }

    Ok(LoadReport {
        chapters: Chapter::build_all(contents),
        failed,
    })
}

//! Social preview pages for news stories.
//!
//! Crawlers (Twitter/X, Facebook, Slack, …) do not run the site's scripts,
//! so story links are shared through a small HTML page that carries the Open
//! Graph and Twitter card tags and immediately redirects real browsers to the
//! canonical story page. Rendering never fails: when the story cannot be
//! fetched, the page falls back to the site-wide tags.

use html_escape::encode_double_quoted_attribute as attr;
use serde::{Deserialize, Serialize};

use crate::api::StoryApi;
use crate::models::NewsItem;

/// Longest description placed in meta tags, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 200;

/// Site-wide values used for every preview and as the fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteMeta {
    pub name: String,
    /// Public origin, without trailing slash.
    pub url: String,
    pub description: String,
    pub image: String,
    pub twitter_handle: Option<String>,
}

impl Default for SiteMeta {
    fn default() -> Self {
        Self {
            name: "MicroplasticsWatch".to_string(),
            url: "https://microplasticswatch.com".to_string(),
            description: "The latest research and news on microplastics and human health."
                .to_string(),
            image: "https://microplasticswatch.com/og-image.png".to_string(),
            twitter_handle: None,
        }
    }
}

impl SiteMeta {
    /// Canonical page of a story. The id is percent-encoded as one path
    /// segment.
    pub fn story_url(&self, id: &str) -> String {
        format!(
            "{}/news/{}",
            self.url.trim_end_matches('/'),
            urlencoding::encode(id)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewMeta {
    pub title: String,
    pub description: String,
    pub image: String,
    /// Canonical story page; also the redirect target.
    pub url: String,
    pub site_name: String,
    pub twitter_handle: Option<String>,
    /// Whether the story was found or this is the generic fallback.
    pub is_fallback: bool,
}

impl PreviewMeta {
    pub fn for_story(site: &SiteMeta, story: &NewsItem) -> Self {
        let description = [&story.ai_summary, &story.summary]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or(site.description.as_str());
        let image = story
            .image_url
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(site.image.as_str());

        Self {
            title: format!("{} | {}", story.title.trim(), site.name),
            description: truncate_chars(description, MAX_DESCRIPTION_CHARS),
            image: image.to_string(),
            url: site.story_url(&story.id),
            site_name: site.name.clone(),
            twitter_handle: site.twitter_handle.clone(),
            is_fallback: false,
        }
    }

    pub fn fallback(site: &SiteMeta, id: &str) -> Self {
        Self {
            title: site.name.clone(),
            description: truncate_chars(&site.description, MAX_DESCRIPTION_CHARS),
            image: site.image.clone(),
            url: site.story_url(id),
            site_name: site.name.clone(),
            twitter_handle: site.twitter_handle.clone(),
            is_fallback: true,
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", cut.trim_end())
}

/// Full HTML document with meta tags and a browser redirect.
pub fn render_preview_html(meta: &PreviewMeta) -> String {
    let title = attr(&meta.title);
    let description = attr(&meta.description);
    let image = attr(&meta.image);
    let url = attr(&meta.url);
    let site_name = attr(&meta.site_name);
    // JSON string literal, with `<` escaped so it cannot close the script tag.
    let js_url = serde_json::to_string(&meta.url)
        .unwrap_or_else(|_| "\"/\"".to_string())
        .replace('<', "\\u003c");

    let mut html = String::with_capacity(2048);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", html_escape::encode_text(&meta.title)));
    html.push_str(&format!("<meta name=\"description\" content=\"{}\">\n", description));
    html.push_str(&format!("<link rel=\"canonical\" href=\"{}\">\n", url));
    html.push_str("<meta property=\"og:type\" content=\"article\">\n");
    html.push_str(&format!("<meta property=\"og:site_name\" content=\"{}\">\n", site_name));
    html.push_str(&format!("<meta property=\"og:title\" content=\"{}\">\n", title));
    html.push_str(&format!("<meta property=\"og:description\" content=\"{}\">\n", description));
    html.push_str(&format!("<meta property=\"og:image\" content=\"{}\">\n", image));
    html.push_str(&format!("<meta property=\"og:url\" content=\"{}\">\n", url));
    html.push_str("<meta name=\"twitter:card\" content=\"summary_large_image\">\n");
    if let Some(handle) = &meta.twitter_handle {
        html.push_str(&format!("<meta name=\"twitter:site\" content=\"{}\">\n", attr(handle)));
    }
    html.push_str(&format!("<meta name=\"twitter:title\" content=\"{}\">\n", title));
    html.push_str(&format!("<meta name=\"twitter:description\" content=\"{}\">\n", description));
    html.push_str(&format!("<meta name=\"twitter:image\" content=\"{}\">\n", image));
    html.push_str(&format!("<meta http-equiv=\"refresh\" content=\"0; url={}\">\n", url));
    html.push_str(&format!("<script>window.location.replace({});</script>\n", js_url));
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!(
        "<p>Redirecting to <a href=\"{}\">{}</a>…</p>\n",
        url,
        html_escape::encode_text(&meta.title)
    ));
    html.push_str("</body>\n</html>\n");
    html
}

/// Looks up the story and renders its preview, falling back to the generic
/// site tags on any error.
pub async fn preview_for(api: &dyn StoryApi, site: &SiteMeta, id: &str) -> String {
    let meta = match api.get_story(id).await {
        Ok(story) => PreviewMeta::for_story(site, &story),
        Err(e) => {
            tracing::warn!(id, "story preview falling back to site defaults: {}", e);
            PreviewMeta::fallback(site, id)
        }
    };
    render_preview_html(&meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library_backend::{Corpus, LocalLibrary};

    fn story() -> NewsItem {
        NewsItem {
            id: "17".to_string(),
            title: "Microplastics found in \"pristine\" lakes".to_string(),
            summary: Some("Plain summary".to_string()),
            ai_summary: Some("  ".to_string()),
            image_url: Some("https://cdn.example.org/lake.jpg".to_string()),
            source_url: None,
            source: None,
            published_at: None,
        }
    }

    #[test]
    fn test_story_meta() {
        let site = SiteMeta::default();
        let meta = PreviewMeta::for_story(&site, &story());
        assert_eq!(meta.description, "Plain summary");
        assert_eq!(meta.image, "https://cdn.example.org/lake.jpg");
        assert_eq!(meta.url, "https://microplasticswatch.com/news/17");
        assert!(!meta.is_fallback);
    }

    #[test]
    fn test_story_url_encodes_path_segment() {
        let site = SiteMeta {
            url: "https://mw.example.org/".to_string(),
            ..SiteMeta::default()
        };
        assert_eq!(site.story_url("a b"), "https://mw.example.org/news/a%20b");
        assert_eq!(site.story_url("c+d/e"), "https://mw.example.org/news/c%2Bd%2Fe");
        assert_eq!(site.story_url("17"), "https://mw.example.org/news/17");
    }

    #[test]
    fn test_ai_summary_preferred() {
        let mut s = story();
        s.ai_summary = Some("AI".to_string());
        let meta = PreviewMeta::for_story(&SiteMeta::default(), &s);
        assert_eq!(meta.description, "AI");
    }

    #[test]
    fn test_description_truncated_on_char_boundary() {
        let mut s = story();
        s.summary = Some("ü".repeat(500));
        let meta = PreviewMeta::for_story(&SiteMeta::default(), &s);
        assert_eq!(meta.description.chars().count(), MAX_DESCRIPTION_CHARS);
        assert!(meta.description.ends_with('…'));
    }

    #[test]
    fn test_html_escapes_attributes() {
        let html = render_preview_html(&PreviewMeta::for_story(&SiteMeta::default(), &story()));
        assert!(html.contains("content=\"Microplastics found in &quot;pristine&quot; lakes"));
        assert!(html.contains("<meta property=\"og:image\" content=\"https://cdn.example.org/lake.jpg\">"));
        assert!(html.contains("window.location.replace(\"https://microplasticswatch.com/news/17\")"));
    }

    #[test]
    fn test_redirect_cannot_break_out_of_script() {
        let meta = PreviewMeta::fallback(&SiteMeta::default(), "</script><script>alert(1)");
        let html = render_preview_html(&meta);
        assert!(!html.contains("</script><script>alert"));
    }

    #[tokio::test]
    async fn test_missing_story_falls_back() {
        let api = LocalLibrary::from_corpus(Corpus::default());
        let site = SiteMeta::default();
        let html = preview_for(&api, &site, "999").await;
        assert!(html.contains(&format!("<meta property=\"og:title\" content=\"{}\">", site.name)));
        assert!(html.contains(&format!("<meta property=\"og:description\" content=\"{}\">", site.description)));
        assert!(html.contains("/news/999"));
    }

    #[tokio::test]
    async fn test_found_story_renders_title() {
        let api = LocalLibrary::from_corpus(Corpus {
            documents: Vec::new(),
            stories: vec![story()],
        });
        let html = preview_for(&api, &SiteMeta::default(), "17").await;
        assert!(html.contains("og:title\" content=\"Microplastics found in &quot;pristine&quot; lakes | MicroplasticsWatch\""));
    }
}

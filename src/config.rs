use anyhow::{Context, Result};
use microplastics_watch_core::preview::SiteMeta;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable overriding `[api].base_url`.
pub const API_BASE_URL_ENV: &str = "MPW_API_BASE_URL";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub site: SiteMeta,
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub whitepaper: WhitepaperConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    15
}

#[derive(Debug, Deserialize, Clone)]
pub struct LibraryConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> usize {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct WhitepaperConfig {
    #[serde(default = "default_whitepaper_url")]
    pub base_url: String,
    #[serde(default = "default_chapters")]
    pub chapters: Vec<String>,
}

impl Default for WhitepaperConfig {
    fn default() -> Self {
        Self {
            base_url: default_whitepaper_url(),
            chapters: default_chapters(),
        }
    }
}

fn default_whitepaper_url() -> String {
    "https://microplasticswatch.com/whitepaper".to_string()
}

fn default_chapters() -> Vec<String> {
    [
        "01-Executive-Summary.md",
        "02-Introduction.md",
        "03-Sources-and-Pathways.md",
        "04-Human-Exposure.md",
        "05-Health-Effects.md",
        "06-Policy-and-Regulation.md",
        "07-Conclusions.md",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Corpus file served as a local library backend.
    #[serde(default)]
    pub corpus: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            corpus: None,
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7340".to_string()
}

impl Config {
    /// Defaults used when no config file exists.
    pub fn minimal() -> Self {
        let mut config = Self {
            api: ApiConfig {
                base_url: "https://api.microplasticswatch.com".to_string(),
                timeout_secs: default_timeout_secs(),
            },
            site: SiteMeta::default(),
            library: LibraryConfig::default(),
            whitepaper: WhitepaperConfig::default(),
            server: ServerConfig::default(),
        };
        apply_env(&mut config, std::env::var(API_BASE_URL_ENV).ok());
        config
    }
}

fn apply_env(config: &mut Config, base_url: Option<String>) {
    if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
        config.api.base_url = url;
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    apply_env(&mut config, std::env::var(API_BASE_URL_ENV).ok());
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.api.base_url.trim().is_empty() {
        anyhow::bail!("api.base_url must not be empty");
    }
    if config.api.timeout_secs == 0 {
        anyhow::bail!("api.timeout_secs must be > 0");
    }
    if !(1..=100).contains(&config.library.page_size) {
        anyhow::bail!("library.page_size must be in [1, 100]");
    }
    if config.whitepaper.base_url.trim().is_empty() {
        anyhow::bail!("whitepaper.base_url must not be empty");
    }
    if config.site.url.trim().is_empty() {
        anyhow::bail!("site.url must not be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_src: &str) -> Result<Config> {
        let config: Config = toml::from_str(toml_src)?;
        validate(&config)?;
        Ok(config)
    }

    #[test]
    fn test_minimal_file_gets_defaults() {
        let config = parse("[api]\nbase_url = \"http://localhost:4000\"\n").unwrap();
        assert_eq!(config.api.timeout_secs, 15);
        assert_eq!(config.library.page_size, 10);
        assert_eq!(config.server.bind, "127.0.0.1:7340");
        assert_eq!(config.whitepaper.chapters.len(), 7);
        assert_eq!(config.site.name, "MicroplasticsWatch");
    }

    #[test]
    fn test_rejects_bad_page_size() {
        let err = parse("[api]\nbase_url = \"x\"\n[library]\npage_size = 0\n").unwrap_err();
        assert!(err.to_string().contains("page_size"));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = parse("[api]\nbase_url = \"x\"\ntimeout_secs = 0\n").unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_env_override() {
        let mut config = parse("[api]\nbase_url = \"http://a\"\n").unwrap();
        apply_env(&mut config, Some("http://b".to_string()));
        assert_eq!(config.api.base_url, "http://b");
        apply_env(&mut config, Some("  ".to_string()));
        assert_eq!(config.api.base_url, "http://b");
    }

    #[test]
    fn test_example_config_parses() {
        let config = parse(include_str!("../config/mpw.example.toml")).unwrap();
        assert_eq!(config.whitepaper.chapters.len(), 7);
        assert_eq!(config.site.twitter_handle.as_deref(), Some("@MicroplasticsW"));
        assert!(config.server.corpus.is_none());
    }

    #[test]
    fn test_full_file() {
        let config = parse(
            r#"
[api]
base_url = "https://api.example.org"

[site]
name = "MW"
url = "https://mw.example.org"
description = "d"
image = "https://mw.example.org/i.png"
twitter_handle = "@mw"

[whitepaper]
base_url = "https://mw.example.org/wp"
chapters = ["a.md", "b.md"]

[server]
bind = "0.0.0.0:8080"
corpus = "data/corpus.json"
"#,
        )
        .unwrap();
        assert_eq!(config.site.twitter_handle.as_deref(), Some("@mw"));
        assert_eq!(config.whitepaper.chapters, vec!["a.md", "b.md"]);
        assert_eq!(config.server.corpus, Some(PathBuf::from("data/corpus.json")));
    }
}

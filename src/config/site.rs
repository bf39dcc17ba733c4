//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub content_dir: String,
    pub public_dir: String,

    // Appearance
    pub theme_color: String,
    pub hidden_theme_color: String,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Feed
    #[serde(default)]
    pub feed: FeedConfig,

    // Footer
    #[serde(default)]
    pub license: LicenseConfig,

    // Authors, keyed by the id used in post front-matter
    #[serde(default)]
    pub authors: IndexMap<String, AuthorConfig>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "inkpress".to_string(),
            description: String::new(),
            author: "anonymous".to_string(),
            language: "en".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            content_dir: "posts".to_string(),
            public_dir: "public".to_string(),

            theme_color: "#171717".to_string(),
            hidden_theme_color: "#ebb305".to_string(),
            highlight: HighlightConfig::default(),

            feed: FeedConfig::default(),
            license: LicenseConfig::default(),
            authors: IndexMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Look up an author by id, falling back to the id itself as display name
    pub fn author(&self, id: &str) -> AuthorConfig {
        self.authors.get(id).cloned().unwrap_or_else(|| AuthorConfig {
            name: id.to_string(),
            links: Vec::new(),
        })
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// syntect theme name; empty string emits CSS classes instead of inline styles
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

/// Atom feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Route and output file name of the feed
    pub path: String,
    /// Maximum number of entries, newest first
    pub limit: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            path: "feed.atom".to_string(),
            limit: 20,
        }
    }
}

/// Content licence shown in the footer and the feed rights
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseConfig {
    pub name: String,
    pub url: String,
}

impl Default for LicenseConfig {
    fn default() -> Self {
        Self {
            name: "CC BY-NC-SA 4.0".to_string(),
            url: "https://creativecommons.org/licenses/by-nc-sa/4.0/".to_string(),
        }
    }
}

/// Author display data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorConfig {
    pub name: String,
    pub links: Vec<AuthorLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorLink {
    pub label: String,
    pub url: String,
}

//! Site configuration (_config.yml)

use anyhow::Result;
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
    pub timezone: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub public_dir: String,
    pub post_dir: String,

    // Date / Time format (Moment.js style, `[...]` for literals)
    pub date_format: String,
    pub datetime_format: String,

    // Reading time
    pub words_per_minute: u32,

    // Seconds between background regenerations in server mode
    pub revalidate: u64,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub comments: CommentsConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "spacetraveling".to_string(),
            description: String::new(),
            author: String::new(),
            language: "pt-br".to_string(),
            timezone: "America/Sao_Paulo".to_string(),

            url: "http://localhost:4000".to_string(),
            root: "/".to_string(),

            public_dir: "public".to_string(),
            post_dir: "post".to_string(),

            date_format: "DD MMM YYYY".to_string(),
            datetime_format: "DD MMM YYYY, [às] HH:mm".to_string(),

            words_per_minute: 200,
            revalidate: 60 * 60,

            api: ApiConfig::default(),
            comments: CommentsConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

/// Content API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Root of the content API, e.g. `https://my-repo.cdn.prismic.io/api/v2`
    pub endpoint: String,
    /// Access token for private repositories
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Custom type holding blog posts
    pub document_type: String,
    /// Number of posts on the first index page and per "load more"
    pub page_size: u32,
    /// Locale passed to single-document lookups
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://your-repo.cdn.prismic.io/api/v2".to_string(),
            access_token: None,
            document_type: "posts".to_string(),
            page_size: 20,
            lang: Some("pt-br".to_string()),
        }
    }
}

/// Comment widget (utterances) configuration.
///
/// The widget is only mounted when `repo` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentsConfig {
    pub repo: String,
    pub issue_term: String,
    pub theme: String,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            repo: String::new(),
            issue_term: "pathname".to_string(),
            theme: "photon-dark".to_string(),
        }
    }
}

impl CommentsConfig {
    pub fn enabled(&self) -> bool {
        !self.repo.trim().is_empty()
    }
}

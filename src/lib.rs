//! spacetraveling: a static blog generator backed by a headless CMS
//!
//! Posts are fetched from a Prismic-style content API, rendered with Tera
//! templates embedded in the binary and written to the public directory.
//! A small dev server adds preview mode and on-demand rendering on top.

pub mod commands;
pub mod config;
pub mod content;
pub mod gateway;
pub mod generator;
pub mod helpers;
pub mod i18n;
pub mod navigation;
pub mod pagination;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gateway::{ContentGateway, PrismicClient};

/// The blog application
#[derive(Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Content source shared by every renderer
    pub gateway: Arc<dyn ContentGateway>,
}

impl Blog {
    /// Assemble a blog from its parts
    pub fn new<P: AsRef<Path>>(
        base_dir: P,
        config: config::SiteConfig,
        gateway: Arc<dyn ContentGateway>,
    ) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let public_dir = base_dir.join(&config.public_dir);
        Self {
            config,
            base_dir,
            public_dir,
            gateway,
        }
    }

    /// Open the site in `base_dir`, connecting to the configured content API.
    ///
    /// `access_token` overrides the token from `_config.yml`.
    pub fn open<P: AsRef<Path>>(base_dir: P, access_token: Option<String>) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::warn!("No _config.yml in {:?}, using defaults", base_dir);
            config::SiteConfig::default()
        };
        if access_token.is_some() {
            config.api.access_token = access_token;
        }

        let client = PrismicClient::new(&config.api.endpoint, config.api.access_token.clone())?;
        Ok(Self::new(base_dir, config, Arc::new(client)))
    }

    /// Directory holding language overrides
    pub fn languages_dir(&self) -> PathBuf {
        self.base_dir.join("languages")
    }

    /// Generate the static site
    pub async fn generate(&self) -> Result<()> {
        commands::generate::run(self).await
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}

//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

const CONFIG_TEMPLATE: &str = r#"# spacetraveling configuration

# Site
title: spacetraveling
description: ''
author: ''
language: pt-br
timezone: America/Sao_Paulo

# URL
url: http://localhost:4000
root: /

# Directory
public_dir: public
post_dir: post

# Date / Time format (Moment.js tokens, [text] is copied as is)
date_format: DD MMM YYYY
datetime_format: DD MMM YYYY, [às] HH:mm

# Reading time
words_per_minute: 200

# Seconds between background regenerations while serving
revalidate: 3600

# Content API
api:
  endpoint: https://your-repo.cdn.prismic.io/api/v2
  # access_token: set here or through PRISMIC_ACCESS_TOKEN
  document_type: posts
  page_size: 20
  lang: pt-br

# Comments (utterances); leave repo empty to disable
comments:
  repo: ''
  issue_term: pathname
  theme: photon-dark
"#;

const GITIGNORE: &str = "public/\n";

/// Initialize a new site in the given directory.
///
/// An existing `_config.yml` is left untouched.
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;
    fs::create_dir_all(target_dir.join("languages"))?;

    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        tracing::warn!("{:?} already exists, keeping it", config_path);
    } else {
        fs::write(&config_path, CONFIG_TEMPLATE)?;
        tracing::debug!("Created: {:?}", config_path);
    }

    let gitignore = target_dir.join(".gitignore");
    if !gitignore.exists() {
        fs::write(&gitignore, GITIGNORE)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("blog");
        init_site(&target).unwrap();

        let config = SiteConfig::load(target.join("_config.yml")).unwrap();
        assert_eq!(config.title, "spacetraveling");
        assert_eq!(config.datetime_format, "DD MMM YYYY, [às] HH:mm");
        assert_eq!(config.api.document_type, "posts");
        assert!(config.api.access_token.is_none());
        assert!(!config.comments.enabled());
        assert!(target.join("languages").is_dir());
        assert!(target.join(".gitignore").exists());
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("_config.yml"), "title: Mine\n").unwrap();

        init_site(dir.path()).unwrap();
        let config = SiteConfig::load(dir.path().join("_config.yml")).unwrap();
        assert_eq!(config.title, "Mine");
    }
}

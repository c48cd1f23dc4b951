//! URL helper functions

use url::Url;

use crate::config::SiteConfig;

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/css/style.css") // -> "/blog/css/style.css"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Site path of a post page, e.g. `/post/como-utilizar-hooks/`
pub fn post_path(config: &SiteConfig, uid: &str) -> String {
    let dir = config.post_dir.trim_matches('/');
    if dir.is_empty() {
        url_for(config, &format!("{}/", uid))
    } else {
        url_for(config, &format!("{}/{}/", dir, uid))
    }
}

/// A page cursor safe to embed in public HTML.
///
/// Drops the `access_token` query parameter; everything else is kept as is.
/// Cursors that do not parse as URLs are returned unchanged.
pub fn public_cursor(cursor: &str) -> String {
    let Ok(mut url) = Url::parse(cursor) else {
        return cursor.to_string();
    };
    if !url.query_pairs().any(|(key, _)| key == "access_token") {
        return cursor.to_string();
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "access_token")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
    url.to_string()
}

/// True for a slug that can safely become a directory name
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('.')
        && !slug.contains(['/', '\\'])
        && !slug.contains("..")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        SiteConfig {
            url: "https://example.com".to_string(),
            root: "/blog/".to_string(),
            ..SiteConfig::default()
        }
    }

    #[test]
    fn test_url_for() {
        let config = test_config();
        assert_eq!(url_for(&config, "/css/style.css"), "/blog/css/style.css");
        assert_eq!(url_for(&config, "about/"), "/blog/about/");
        assert_eq!(url_for(&config, ""), "/blog/");
    }

    #[test]
    fn test_post_path() {
        let config = SiteConfig::default();
        assert_eq!(
            post_path(&config, "como-utilizar-hooks"),
            "/post/como-utilizar-hooks/"
        );
        assert_eq!(post_path(&test_config(), "x"), "/blog/post/x/");
    }

    #[test]
    fn test_public_cursor_strips_token() {
        let cursor = "https://repo.cdn.prismic.io/api/v2/documents/search?ref=abc&access_token=secret&page=2";
        let public = public_cursor(cursor);
        assert!(!public.contains("secret"));
        assert!(public.contains("ref=abc"));
        assert!(public.contains("page=2"));
    }

    #[test]
    fn test_public_cursor_untouched_without_token() {
        let cursor = "https://repo.cdn.prismic.io/api/v2/documents/search?ref=abc&page=2";
        assert_eq!(public_cursor(cursor), cursor);
        assert_eq!(public_cursor("page2"), "page2");
    }

    #[test]
    fn test_slug_validation() {
        assert!(is_valid_slug("como-utilizar-hooks"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug(".hidden"));
        assert!(!is_valid_slug("../etc"));
        assert!(!is_valid_slug("a/b"));
    }
}

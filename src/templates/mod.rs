//! Built-in spacetraveling theme using the Tera template engine
//!
//! Templates and assets are embedded in the binary. Autoescaping stays on for
//! every `.html` template; content that is already markup (section headings
//! and rich-text bodies) reaches the templates as [`TrustedHtml`] and is
//! emitted with `| safe`.

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

use crate::content::TrustedHtml;

/// Stylesheet written to `css/style.css`
pub const STYLE_CSS: &str = include_str!("spacetraveling/style.css");

/// "Load more" script written to `js/load_more.js`
pub const LOAD_MORE_JS: &str = include_str!("spacetraveling/load_more.js");

/// Template renderer with the embedded theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("spacetraveling/layout.html")),
            ("index.html", include_str!("spacetraveling/index.html")),
            ("post.html", include_str!("spacetraveling/post.html")),
            ("404.html", include_str!("spacetraveling/404.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("spacetraveling/partials/header.html"),
            ),
            (
                "partials/post_nav.html",
                include_str!("spacetraveling/partials/post_nav.html"),
            ),
            (
                "partials/comments.html",
                include_str!("spacetraveling/partials/comments.html"),
            ),
            (
                "partials/preview.html",
                include_str!("spacetraveling/partials/preview.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub url: String,
    pub root: String,
    pub language: String,
    /// Prefix of post URLs, used by the load-more script
    pub post_base: String,
    pub css_path: String,
    pub js_path: String,
}

/// One entry of the post list
#[derive(Debug, Clone, Serialize)]
pub struct PostSummaryData {
    pub uid: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub path: String,
    /// Formatted first publication date, empty for unpublished drafts
    pub published: String,
    pub published_iso: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub id: String,
    pub uid: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub path: String,
    pub banner_url: String,
    pub banner_alt: String,
    pub published: String,
    pub published_iso: String,
    /// Localized "edited" notice; `None` when never edited
    pub edited: Option<String>,
    /// Localized reading time label, e.g. `4 min`
    pub reading_time: String,
    pub sections: Vec<SectionData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionData {
    pub heading: TrustedHtml,
    pub body: TrustedHtml,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavPost {
    pub title: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationData {
    /// Cursor of the next page, safe to publish
    pub next_page: Option<String>,
    pub total_results: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentsData {
    pub repo: String,
    pub issue_term: String,
    pub theme: String,
}

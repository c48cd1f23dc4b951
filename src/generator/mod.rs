//! Generator module - renders pages from CMS content with the built-in templates
//!
//! The same render functions serve the static build and the dev server; the
//! server passes a preview ref to render drafts live.

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use tera::Context;

use crate::content::Post;
use crate::gateway::{GetOptions, Ordering, PreviewRef, QueryOptions};
use crate::helpers::{date_xml, is_valid_slug, post_path, public_cursor, url_for, DateFormatter};
use crate::i18n::I18n;
use crate::navigation::resolve_adjacent;
use crate::pagination::PostPagination;
use crate::templates::{
    CommentsData, ConfigData, NavPost, PaginationData, PostData, PostSummaryData, SectionData,
    TemplateRenderer, LOAD_MORE_JS, STYLE_CSS,
};
use crate::Blog;

const CSS_PATH: &str = "css/style.css";
const JS_PATH: &str = "js/load_more.js";
const EXIT_PREVIEW_PATH: &str = "api/exit-preview";

/// Static site generator using Tera templates
pub struct Generator {
    blog: Blog,
    renderer: TemplateRenderer,
    i18n: I18n,
    dates: DateFormatter,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Result<Self> {
        let renderer = TemplateRenderer::new()?;
        let mut i18n = I18n::new(&blog.config.language);
        i18n.load_languages(blog.languages_dir())?;
        let dates = DateFormatter::from_config(&blog.config)?;

        Ok(Self {
            blog: blog.clone(),
            renderer,
            i18n,
            dates,
        })
    }

    /// Generate the entire site; returns the number of post pages written
    pub async fn generate(&self) -> Result<usize> {
        fs::create_dir_all(&self.blog.public_dir)?;
        self.write_assets()?;

        let mut pagination = PostPagination::first_page(
            self.blog.gateway.clone(),
            &self.blog.config.api.document_type,
            &self.index_query(None),
        )
        .await?;

        let index = self.render_index_page(&pagination, None)?;
        self.write_file(self.blog.public_dir.join("index.html"), &index)?;

        // The index only shows the first page; post pages need every post
        pagination.load_all().await?;
        let posts = pagination.into_posts();
        tracing::info!("Fetched {} posts", posts.len());

        let mut written = 0;
        for post in &posts {
            let Some(uid) = post.uid.as_deref() else {
                tracing::warn!("Skipping post {} without a uid", post.id);
                continue;
            };
            if !is_valid_slug(uid) {
                tracing::warn!("Skipping post {} with unusable uid {:?}", post.id, uid);
                continue;
            }
            let html = self.render_post_page(post, None).await?;
            self.write_post(uid, &html)?;
            written += 1;
        }

        let not_found = self.render_not_found(None)?;
        self.write_file(self.blog.public_dir.join("404.html"), &not_found)?;

        Ok(written)
    }

    /// Render the home page from the first page of posts
    pub async fn render_index(&self, preview: Option<&PreviewRef>) -> Result<String> {
        let pagination = PostPagination::first_page(
            self.blog.gateway.clone(),
            &self.blog.config.api.document_type,
            &self.index_query(preview),
        )
        .await?;
        self.render_index_page(&pagination, preview)
    }

    /// Render the page of the post with this uid; `None` if it does not exist
    pub async fn render_post(&self, uid: &str, preview: Option<&PreviewRef>) -> Result<Option<String>> {
        let options = GetOptions {
            lang: self.blog.config.api.lang.clone(),
            preview_ref: preview.cloned(),
        };
        let document = self
            .blog
            .gateway
            .get_by_uid(&self.blog.config.api.document_type, uid, &options)
            .await?;

        match document {
            Some(document) => {
                let post = Post::from_document(document);
                Ok(Some(self.render_post_page(&post, preview).await?))
            }
            None => Ok(None),
        }
    }

    /// Render the 404 page
    pub fn render_not_found(&self, preview: Option<&PreviewRef>) -> Result<String> {
        let context = self.create_base_context(preview);
        self.renderer.render("404.html", &context)
    }

    /// Write a rendered post page to `public/<post_dir>/<uid>/index.html`
    pub fn write_post(&self, uid: &str, html: &str) -> Result<PathBuf> {
        if !is_valid_slug(uid) {
            anyhow::bail!("Invalid post uid: {:?}", uid);
        }
        let output_path = self
            .blog
            .public_dir
            .join(self.blog.config.post_dir.trim_matches('/'))
            .join(uid)
            .join("index.html");
        self.write_file(output_path.clone(), html)?;
        Ok(output_path)
    }

    /// Site path of a post, for redirects
    pub fn post_url(&self, uid: &str) -> String {
        post_path(&self.blog.config, uid)
    }

    fn index_query(&self, preview: Option<&PreviewRef>) -> QueryOptions {
        QueryOptions {
            page_size: Some(self.blog.config.api.page_size),
            ordering: Some(Ordering::Descending),
            preview_ref: preview.cloned(),
            after: None,
            lang: self.blog.config.api.lang.clone(),
        }
    }

    fn render_index_page(
        &self,
        pagination: &PostPagination,
        preview: Option<&PreviewRef>,
    ) -> Result<String> {
        let posts: Vec<PostSummaryData> = pagination
            .posts()
            .iter()
            .filter_map(|post| self.build_summary(post))
            .collect();

        let pagination_data = PaginationData {
            next_page: pagination.next_page().map(public_cursor),
            total_results: pagination.total_results(),
        };

        let mut context = self.create_base_context(preview);
        context.insert("posts", &posts);
        context.insert("pagination", &pagination_data);
        self.renderer.render("index.html", &context)
    }

    async fn render_post_page(&self, post: &Post, preview: Option<&PreviewRef>) -> Result<String> {
        let adjacent = resolve_adjacent(
            self.blog.gateway.as_ref(),
            &self.blog.config.api.document_type,
            &post.id,
            preview,
        )
        .await?;

        let mut context = self.create_base_context(preview);
        context.insert("post", &self.build_post_data(post));
        context.insert(
            "prev_post",
            &adjacent.previous.as_ref().and_then(|p| self.build_nav(p)),
        );
        context.insert(
            "next_post",
            &adjacent.next.as_ref().and_then(|p| self.build_nav(p)),
        );
        context.insert("comments", &self.build_comments_data());
        self.renderer.render("post.html", &context)
    }

    /// Create a base context with common variables
    fn create_base_context(&self, preview: Option<&PreviewRef>) -> Context {
        let mut context = Context::new();
        context.insert("config", &self.build_config_data());
        context.insert("t", &self.i18n.get_all_translations());
        context.insert("preview", &preview.is_some());
        context.insert("exit_preview_path", &url_for(&self.blog.config, EXIT_PREVIEW_PATH));
        context
    }

    fn build_config_data(&self) -> ConfigData {
        let config = &self.blog.config;
        ConfigData {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            url: config.url.clone(),
            root: url_for(config, ""),
            language: config.language.clone(),
            post_base: url_for(config, &format!("{}/", config.post_dir.trim_matches('/'))),
            css_path: url_for(config, CSS_PATH),
            js_path: url_for(config, JS_PATH),
        }
    }

    fn build_summary(&self, post: &Post) -> Option<PostSummaryData> {
        let uid = post.uid.as_deref()?;
        Some(PostSummaryData {
            uid: uid.to_string(),
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            author: post.author.clone(),
            path: post_path(&self.blog.config, uid),
            published: post
                .first_publication_date
                .map(|d| self.dates.date(&d))
                .unwrap_or_default(),
            published_iso: post.first_publication_date.map(|d| date_xml(&d)).unwrap_or_default(),
        })
    }

    fn build_post_data(&self, post: &Post) -> PostData {
        let uid = post.uid.clone().unwrap_or_default();
        PostData {
            id: post.id.clone(),
            path: post_path(&self.blog.config, &uid),
            uid,
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            author: post.author.clone(),
            banner_url: post.banner.url.clone(),
            banner_alt: post.banner.alt.clone().unwrap_or_default(),
            published: post
                .first_publication_date
                .map(|d| self.dates.date(&d))
                .unwrap_or_default(),
            published_iso: post.first_publication_date.map(|d| date_xml(&d)).unwrap_or_default(),
            edited: post
                .edited_at()
                .map(|at| self.i18n.format("edited", self.dates.datetime(&at))),
            reading_time: self.i18n.format(
                "reading_time",
                post.reading_time(self.blog.config.words_per_minute),
            ),
            sections: post
                .content
                .iter()
                .map(|section| SectionData {
                    heading: section.heading.clone(),
                    body: section.body.as_html(),
                })
                .collect(),
        }
    }

    fn build_nav(&self, post: &Post) -> Option<NavPost> {
        let uid = post.uid.as_deref()?;
        Some(NavPost {
            title: post.title.clone(),
            path: post_path(&self.blog.config, uid),
        })
    }

    fn build_comments_data(&self) -> Option<CommentsData> {
        let comments = &self.blog.config.comments;
        comments.enabled().then(|| CommentsData {
            repo: comments.repo.clone(),
            issue_term: comments.issue_term.clone(),
            theme: comments.theme.clone(),
        })
    }

    fn write_assets(&self) -> Result<()> {
        self.write_file(self.blog.public_dir.join(CSS_PATH), STYLE_CSS)?;
        self.write_file(self.blog.public_dir.join(JS_PATH), LOAD_MORE_JS)?;
        Ok(())
    }

    fn write_file(&self, output_path: PathBuf, content: &str) -> Result<()> {
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
        }
        fs::write(&output_path, content)
            .map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", output_path, e))?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::gateway::fake::{document, FakeGateway};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn site_config() -> SiteConfig {
        let mut config = SiteConfig::default();
        config.language = "en".to_string();
        config.timezone = "UTC".to_string();
        config.date_format = "YYYY-MM-DD".to_string();
        config.datetime_format = "YYYY-MM-DD HH:mm".to_string();
        config
    }

    fn gateway() -> FakeGateway {
        let a = document("A", "first", "2021-03-01T10:00:00+0000");
        let b = document("B", "second", "2021-03-02T10:00:00+0000");
        let mut c = document("C", "third", "2021-03-03T10:00:00+0000");
        c.last_publication_date = Some("2021-03-04T12:30:00+0000".to_string());
        let mut draft = document("D", "", "2021-03-05T10:00:00+0000");
        draft.uid = None;

        FakeGateway::new()
            .with_first_page(vec![c.clone(), b.clone()], Some("page2"))
            .with_page("page2", vec![a.clone(), draft.clone()], None)
            .with_catalogue(vec![a, b, c, draft])
    }

    fn generator(dir: &TempDir, config: SiteConfig, gateway: FakeGateway) -> Generator {
        let blog = Blog::new(dir.path(), config, Arc::new(gateway));
        Generator::new(&blog).unwrap()
    }

    #[tokio::test]
    async fn test_generate_writes_every_page() {
        let dir = TempDir::new().unwrap();
        let generator = generator(&dir, site_config(), gateway());

        let written = generator.generate().await.unwrap();
        assert_eq!(written, 3);

        let public = dir.path().join("public");
        assert!(public.join("index.html").exists());
        assert!(public.join("404.html").exists());
        assert!(public.join("css/style.css").exists());
        assert!(public.join("js/load_more.js").exists());
        for uid in ["first", "second", "third"] {
            assert!(public.join("post").join(uid).join("index.html").exists());
        }

        let index = fs::read_to_string(public.join("index.html")).unwrap();
        assert!(index.contains("Post C"));
        assert!(index.contains("Post B"));
        // Second page is left to the load-more button
        assert!(!index.contains("Post A"));
        assert!(index.contains(r#"data-next-page="page2""#));
    }

    #[tokio::test]
    async fn test_post_page_content() {
        let dir = TempDir::new().unwrap();
        let generator = generator(&dir, site_config(), gateway());

        let html = generator.render_post("second", None).await.unwrap().unwrap();
        assert!(html.contains("<h1>Post B</h1>"));
        assert!(html.contains("2021-03-02"));
        assert!(html.contains("1 min"));
        assert!(html.contains("<p>Lorem ipsum dolor</p>"));
        assert!(html.contains("Post A"));
        assert!(html.contains("Post C"));
        assert!(!html.contains("class=\"edited\""));
        assert!(!html.contains("utteranc.es"));
        assert!(!html.contains("Exit preview mode"));
    }

    #[tokio::test]
    async fn test_edited_notice_uses_datetime_format() {
        let dir = TempDir::new().unwrap();
        let generator = generator(&dir, site_config(), gateway());

        let html = generator.render_post("third", None).await.unwrap().unwrap();
        assert!(html.contains("* edited on 2021-03-04 12:30"));
        // Newest post: nothing after it
        assert!(!html.contains("Next post"));
    }

    #[tokio::test]
    async fn test_unknown_uid_is_none() {
        let dir = TempDir::new().unwrap();
        let generator = generator(&dir, site_config(), gateway());
        assert!(generator.render_post("missing", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_preview_render_shows_exit_link() {
        let dir = TempDir::new().unwrap();
        let generator = generator(&dir, site_config(), gateway());
        let preview = PreviewRef::new("preview-ref");

        let html = generator.render_index(Some(&preview)).await.unwrap();
        assert!(html.contains("Exit preview mode"));
        assert!(html.contains("&#x2F;api&#x2F;exit-preview"));
    }

    #[tokio::test]
    async fn test_comments_widget_when_configured() {
        let dir = TempDir::new().unwrap();
        let mut config = site_config();
        config.comments.repo = "user/comments".to_string();
        let generator = generator(&dir, config, gateway());

        let html = generator.render_post("first", None).await.unwrap().unwrap();
        assert!(html.contains("utteranc.es/client.js"));
        assert!(html.contains(r#"theme="photon-dark""#));
    }

    #[test]
    fn test_write_post_rejects_unsafe_uid() {
        let dir = TempDir::new().unwrap();
        let generator = generator(&dir, site_config(), FakeGateway::new());
        assert!(generator.write_post("../escape", "<html></html>").is_err());

        let path = generator.write_post("ok", "<html></html>").unwrap();
        assert_eq!(path, dir.path().join("public/post/ok/index.html"));
    }
}

//! "Load more" pagination over the post list
//!
//! [`PostPagination`] owns the posts loaded so far and the cursor of the next
//! page. The list is append-only: each [`PostPagination::load_more`] call adds
//! one page at the end and nothing is ever removed or reordered.
//!
//! `load_more` takes `&mut self`, so two fetches can never be in flight on the
//! same controller. A caller sharing one controller between tasks has to put
//! it behind a mutex; the controller itself holds no lock.

use std::sync::Arc;
use thiserror::Error;

use crate::content::{Post, ResultsPage};
use crate::gateway::{ContentGateway, GatewayError, QueryOptions};

#[derive(Debug, Error)]
pub enum PaginationError {
    #[error("no more pages to load")]
    Exhausted,
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Loaded posts plus the locator of the next page
pub struct PostPagination {
    gateway: Arc<dyn ContentGateway>,
    posts: Vec<Post>,
    next_page: Option<String>,
    total_results: usize,
}

impl PostPagination {
    /// Start from an already fetched first page
    pub fn new(gateway: Arc<dyn ContentGateway>, first_page: ResultsPage<Post>) -> Self {
        Self {
            gateway,
            posts: first_page.results,
            next_page: normalize_cursor(first_page.next_page),
            total_results: first_page.total_results_size,
        }
    }

    /// Fetch the first page of `document_type` and start from it
    pub async fn first_page(
        gateway: Arc<dyn ContentGateway>,
        document_type: &str,
        options: &QueryOptions,
    ) -> Result<Self, GatewayError> {
        let page = gateway.query_by_type(document_type, options).await?;
        Ok(Self::new(gateway, page.map(Post::from_document)))
    }

    /// Posts loaded so far, in fetch order
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Consume the controller, keeping only the loaded posts
    pub fn into_posts(self) -> Vec<Post> {
        self.posts
    }

    /// Cursor of the next page; `None` once the list is exhausted
    pub fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref()
    }

    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }

    /// Total-count hint from the most recent page
    pub fn total_results(&self) -> usize {
        self.total_results
    }

    /// Fetch the next page and append its posts.
    ///
    /// Returns how many posts were appended (possibly zero). Fails with
    /// [`PaginationError::Exhausted`] when there is no cursor left. On a
    /// gateway failure nothing is appended and the cursor is kept.
    pub async fn load_more(&mut self) -> Result<usize, PaginationError> {
        let cursor = self.next_page.as_deref().ok_or(PaginationError::Exhausted)?;
        let page = self.gateway.fetch_page(cursor).await?;

        let page = page.map(Post::from_document);
        let loaded = page.results.len();
        self.posts.extend(page.results);
        self.next_page = normalize_cursor(page.next_page);
        self.total_results = page.total_results_size;

        tracing::debug!(
            "Loaded {} more posts ({} total, more: {})",
            loaded,
            self.posts.len(),
            self.has_more()
        );
        Ok(loaded)
    }

    /// Keep loading until the cursor runs out
    pub async fn load_all(&mut self) -> Result<(), PaginationError> {
        while self.has_more() {
            self.load_more().await?;
        }
        Ok(())
    }
}

/// An empty or blank cursor means the same as no cursor
fn normalize_cursor(cursor: Option<String>) -> Option<String> {
    cursor.filter(|c| !c.trim().is_empty())
}

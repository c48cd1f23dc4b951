//! Content gateway - access to the headless CMS
//!
//! Everything that talks to the content API goes through [`ContentGateway`].
//! The HTTP implementation is [`PrismicClient`]; it is constructed once by the
//! caller and handed around as `Arc<dyn ContentGateway>`, so tests can swap in
//! an in-memory gateway.

mod prismic;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;
use thiserror::Error;

use crate::content::{Document, ResultsPage};

pub use prismic::PrismicClient;

/// Errors raised while talking to the content API
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("endpoint cannot carry a path: {0}")]
    InvalidEndpoint(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("content API returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("content API did not advertise a master ref")]
    MissingMasterRef,
}

/// Opaque token selecting draft content instead of the published release.
///
/// Preview mode is on exactly when one of these is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRef(String);

impl PreviewRef {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Result ordering by first publication date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordering {
    Ascending,
    Descending,
}

impl Ordering {
    /// Ordering expression understood by the content API
    pub fn as_query(&self) -> &'static str {
        match self {
            Ordering::Ascending => "[document.first_publication_date]",
            Ordering::Descending => "[document.first_publication_date desc]",
        }
    }
}

/// Options for a list query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub page_size: Option<u32>,
    pub ordering: Option<Ordering>,
    pub preview_ref: Option<PreviewRef>,
    /// Only return documents after this id in the chosen ordering
    pub after: Option<String>,
    pub lang: Option<String>,
}

/// Options for a single-document lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetOptions {
    pub lang: Option<String>,
    pub preview_ref: Option<PreviewRef>,
}

/// Read access to the content API
#[async_trait]
pub trait ContentGateway: Send + Sync {
    /// List documents of one custom type
    async fn query_by_type(
        &self,
        document_type: &str,
        options: &QueryOptions,
    ) -> Result<ResultsPage<Document>, GatewayError>;

    /// Fetch the page behind a cursor previously returned as `next_page`
    async fn fetch_page(&self, cursor: &str) -> Result<ResultsPage<Document>, GatewayError>;

    /// Look a document up by its unique slug; `Ok(None)` when it does not exist
    async fn get_by_uid(
        &self,
        document_type: &str,
        uid: &str,
        options: &GetOptions,
    ) -> Result<Option<Document>, GatewayError>;

    /// Look a document up by id; `Ok(None)` when it does not exist
    async fn get_by_id(
        &self,
        id: &str,
        preview_ref: Option<&PreviewRef>,
    ) -> Result<Option<Document>, GatewayError>;
}

//! Previous/next post links

use crate::content::Post;
use crate::gateway::{ContentGateway, GatewayError, Ordering, PreviewRef, QueryOptions};

/// Neighbours of a post by first publication date
#[derive(Debug, Clone, Default)]
pub struct AdjacentPosts {
    /// The post published just before
    pub previous: Option<Post>,
    /// The post published just after
    pub next: Option<Post>,
}

/// Find the posts published immediately before and after `post_id`.
///
/// Both lookups run concurrently. A side with no result is `None`; which post
/// wins on equal publication dates is up to the gateway.
pub async fn resolve_adjacent(
    gateway: &dyn ContentGateway,
    document_type: &str,
    post_id: &str,
    preview_ref: Option<&PreviewRef>,
) -> Result<AdjacentPosts, GatewayError> {
    let (previous, next) = tokio::try_join!(
        neighbour(gateway, document_type, post_id, preview_ref, Ordering::Descending),
        neighbour(gateway, document_type, post_id, preview_ref, Ordering::Ascending),
    )?;
    Ok(AdjacentPosts { previous, next })
}

async fn neighbour(
    gateway: &dyn ContentGateway,
    document_type: &str,
    post_id: &str,
    preview_ref: Option<&PreviewRef>,
    ordering: Ordering,
) -> Result<Option<Post>, GatewayError> {
    let options = QueryOptions {
        page_size: Some(1),
        ordering: Some(ordering),
        preview_ref: preview_ref.cloned(),
        after: Some(post_id.to_string()),
        lang: None,
    };
    let page = gateway.query_by_type(document_type, &options).await?;
    Ok(page.results.into_iter().next().map(Post::from_document))
}

//! List posts from the content API

use anyhow::Result;

use crate::content::Post;
use crate::gateway::{Ordering, QueryOptions};
use crate::helpers::DateFormatter;
use crate::pagination::PostPagination;
use crate::Blog;

/// Print the first page of posts, or every post with `all`
pub async fn run(blog: &Blog, all: bool) -> Result<()> {
    let dates = DateFormatter::from_config(&blog.config)?;
    let options = QueryOptions {
        page_size: Some(blog.config.api.page_size),
        ordering: Some(Ordering::Descending),
        lang: blog.config.api.lang.clone(),
        ..Default::default()
    };

    let mut pagination =
        PostPagination::first_page(blog.gateway.clone(), &blog.config.api.document_type, &options)
            .await?;
    if all {
        pagination.load_all().await?;
    }

    println!(
        "Posts ({} of {}):",
        pagination.posts().len(),
        pagination.total_results()
    );
    for post in pagination.posts() {
        println!("  {}", describe(post, &dates, blog.config.words_per_minute));
    }
    if pagination.has_more() {
        println!("  ... use --all to list every post");
    }

    Ok(())
}

/// One line per post: date, title, uid and reading time
fn describe(post: &Post, dates: &DateFormatter, words_per_minute: u32) -> String {
    let date = post
        .first_publication_date
        .map(|d| dates.date(&d))
        .unwrap_or_else(|| "draft".to_string());
    format!(
        "{} - {} [{}] {} min",
        date,
        post.title,
        post.uid.as_deref().unwrap_or("-"),
        post.reading_time(words_per_minute)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::fake::document;
    use chrono::Locale;
    use chrono_tz::Tz;

    #[test]
    fn test_describe_post() {
        let dates = DateFormatter::new(Tz::UTC, Locale::POSIX, "YYYY-MM-DD", "YYYY-MM-DD HH:mm");
        let post = Post::from_document(document("A", "hello", "2021-03-01T10:00:00+0000"));
        assert_eq!(describe(&post, &dates, 200), "2021-03-01 - Post A [hello] 1 min");

        let mut draft = document("B", "", "x");
        draft.uid = None;
        draft.first_publication_date = None;
        let draft = Post::from_document(draft);
        assert_eq!(describe(&draft, &dates, 200), "draft - Post B [-] 1 min");
    }
}

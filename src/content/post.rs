//! Post model and normalization from raw documents

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::document::{parse_publication_date, Document};
use super::richtext::{RichText, TrustedHtml};

/// Reading speed used when the site does not configure one
pub const DEFAULT_WORDS_PER_MINUTE: u32 = 200;

/// A blog post
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    /// Document id assigned by the content API
    pub id: String,

    /// Human-readable unique slug; drafts may not have one yet
    pub uid: Option<String>,

    /// First publication date (absent for never-published drafts)
    pub first_publication_date: Option<DateTime<Utc>>,

    /// Last publication date
    pub last_publication_date: Option<DateTime<Utc>>,

    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub banner: Banner,

    /// Content sections in source order
    pub content: Vec<ContentSection>,
}

/// Banner image of a post
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Banner {
    pub url: String,
    pub alt: Option<String>,
}

/// A heading followed by its body
#[derive(Debug, Clone, PartialEq)]
pub struct ContentSection {
    /// May contain markup from the content API
    pub heading: TrustedHtml,
    pub body: RichText,
}

impl Post {
    /// Normalize a raw document.
    ///
    /// Never fails: missing or malformed fields fall back to empty values.
    pub fn from_document(document: Document) -> Self {
        let data = &document.data;

        let banner = data
            .get("banner")
            .map(|banner| Banner {
                url: banner
                    .get("url")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string(),
                alt: banner
                    .get("alt")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
            .unwrap_or_default();

        let content = data
            .get("content")
            .and_then(Value::as_array)
            .map(|sections| sections.iter().map(parse_section).collect())
            .unwrap_or_default();

        Self {
            first_publication_date: document
                .first_publication_date
                .as_deref()
                .and_then(parse_publication_date),
            last_publication_date: document
                .last_publication_date
                .as_deref()
                .and_then(parse_publication_date),
            title: text_field(data.get("title")),
            subtitle: text_field(data.get("subtitle")),
            author: text_field(data.get("author")),
            banner,
            content,
            uid: document.uid.filter(|uid| !uid.is_empty()),
            id: document.id,
        }
    }

    /// Total words across every section body (headings excluded)
    pub fn word_count(&self) -> usize {
        self.content.iter().map(|s| s.body.word_count()).sum()
    }

    /// Estimated reading time in whole minutes, rounded up
    pub fn reading_time(&self, words_per_minute: u32) -> u32 {
        estimate_reading_time(self.word_count(), words_per_minute)
    }

    /// The last publication date, if the post was edited after it first went out.
    ///
    /// Compares the raw timestamps so locale formatting cannot hide a change.
    pub fn edited_at(&self) -> Option<DateTime<Utc>> {
        let last = self.last_publication_date?;
        if self.first_publication_date == Some(last) {
            None
        } else {
            Some(last)
        }
    }
}

/// `ceil(words / words_per_minute)`; no words (or a zero rate) reads in 0 minutes
pub fn estimate_reading_time(words: usize, words_per_minute: u32) -> u32 {
    if words == 0 || words_per_minute == 0 {
        return 0;
    }
    let minutes = words.div_ceil(words_per_minute as usize);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

fn parse_section(section: &Value) -> ContentSection {
    let heading = match section.get("heading") {
        Some(Value::String(s)) => TrustedHtml::from_gateway(s.clone()),
        Some(value @ Value::Array(_)) => RichText::from_value(value).as_inline_html(),
        _ => TrustedHtml::default(),
    };
    let body = section
        .get("body")
        .map(RichText::from_value)
        .unwrap_or_default();
    ContentSection { heading, body }
}

/// Read a text field that may be stored as a plain string or as rich text
fn text_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(value @ Value::Array(_)) => RichText::from_value(value).as_text(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn document(data: Value) -> Document {
        Document {
            id: "YF1".to_string(),
            uid: Some("como-utilizar-hooks".to_string()),
            doc_type: "posts".to_string(),
            lang: Some("pt-br".to_string()),
            first_publication_date: Some("2021-03-15T19:25:28+0000".to_string()),
            last_publication_date: Some("2021-03-15T19:25:28+0000".to_string()),
            data,
        }
    }

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    fn post_with_bodies(bodies: &[&str]) -> Post {
        let sections: Vec<Value> = bodies
            .iter()
            .map(|text| {
                json!({
                    "heading": "Section",
                    "body": [{"type": "paragraph", "text": text, "spans": []}]
                })
            })
            .collect();
        Post::from_document(document(json!({ "content": sections })))
    }

    #[test]
    fn test_from_document_maps_fields() {
        let post = Post::from_document(document(json!({
            "title": "Como utilizar Hooks",
            "subtitle": "Pensando em sincronização",
            "author": "Joseph Oliveira",
            "banner": {"url": "https://images.prismic.io/banner.png", "alt": "Banner"},
            "content": [
                {"heading": "Proin <em>et</em>", "body": [{"type": "paragraph", "text": "one two", "spans": []}]},
                {"heading": "Cras laoreet", "body": [{"type": "paragraph", "text": "three", "spans": []}]}
            ]
        })));

        assert_eq!(post.id, "YF1");
        assert_eq!(post.uid.as_deref(), Some("como-utilizar-hooks"));
        assert_eq!(post.title, "Como utilizar Hooks");
        assert_eq!(post.subtitle, "Pensando em sincronização");
        assert_eq!(post.author, "Joseph Oliveira");
        assert_eq!(post.banner.url, "https://images.prismic.io/banner.png");
        assert_eq!(post.content.len(), 2);
        assert_eq!(post.content[0].heading.as_str(), "Proin <em>et</em>");
        assert_eq!(post.content[1].heading.as_str(), "Cras laoreet");
        assert_eq!(
            post.first_publication_date,
            Some(Utc.with_ymd_and_hms(2021, 3, 15, 19, 25, 28).unwrap())
        );
    }

    #[test]
    fn test_missing_fields_degrade_to_empty() {
        let mut doc = document(json!({"banner": {}, "content": "not a list"}));
        doc.first_publication_date = Some("garbage".to_string());
        doc.last_publication_date = None;
        doc.uid = Some(String::new());

        let post = Post::from_document(doc);
        assert_eq!(post.title, "");
        assert_eq!(post.author, "");
        assert_eq!(post.banner.url, "");
        assert!(post.content.is_empty());
        assert!(post.first_publication_date.is_none());
        assert!(post.uid.is_none());
        assert_eq!(post.reading_time(DEFAULT_WORDS_PER_MINUTE), 0);
    }

    #[test]
    fn test_rich_text_title_is_flattened() {
        let post = Post::from_document(document(json!({
            "title": [{"type": "heading1", "text": "Rich title", "spans": []}]
        })));
        assert_eq!(post.title, "Rich title");
    }

    #[test]
    fn test_rich_text_heading_is_escaped() {
        let post = Post::from_document(document(json!({
            "content": [{
                "heading": [{
                    "type": "heading2",
                    "text": "a < b && <img src=x>",
                    "spans": [{"start": 0, "end": 1, "type": "strong"}]
                }],
                "body": []
            }]
        })));
        assert_eq!(
            post.content[0].heading.as_str(),
            "<strong>a</strong> &lt; b &amp;&amp; &lt;img src=x&gt;"
        );
    }

    #[test]
    fn test_reading_time_boundaries() {
        assert_eq!(post_with_bodies(&[]).reading_time(200), 0);
        assert_eq!(post_with_bodies(&[""]).reading_time(200), 0);
        assert_eq!(post_with_bodies(&[&words(1)]).reading_time(200), 1);
        assert_eq!(post_with_bodies(&[&words(200)]).reading_time(200), 1);
        assert_eq!(post_with_bodies(&[&words(201)]).reading_time(200), 2);
    }

    #[test]
    fn test_reading_time_sums_sections() {
        let post = post_with_bodies(&[&words(150), &words(100)]);
        assert_eq!(post.word_count(), 250);
        assert_eq!(post.reading_time(200), 2);
    }

    #[test]
    fn test_reading_time_is_monotonic() {
        let mut previous = 0;
        for n in 0..=1000 {
            let minutes = estimate_reading_time(n, 200);
            assert!(minutes >= previous);
            previous = minutes;
        }
    }

    #[test]
    fn test_zero_rate_does_not_divide() {
        assert_eq!(estimate_reading_time(500, 0), 0);
    }

    #[test]
    fn test_edited_at_suppressed_for_equal_timestamps() {
        let post = Post::from_document(document(json!({})));
        assert!(post.edited_at().is_none());
    }

    #[test]
    fn test_edited_at_compares_raw_timestamps() {
        // Same minute, different seconds: formatted strings could match
        let mut doc = document(json!({}));
        doc.last_publication_date = Some("2021-03-15T19:25:59+0000".to_string());
        let post = Post::from_document(doc);
        assert_eq!(
            post.edited_at(),
            Some(Utc.with_ymd_and_hms(2021, 3, 15, 19, 25, 59).unwrap())
        );
    }
}

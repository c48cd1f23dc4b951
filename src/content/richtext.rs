//! Structured rich text as delivered by the content API
//!
//! The API hands over text already split into typed blocks with span
//! annotations. Nothing here parses markup; blocks are only serialized to
//! plain text (for word counting) or to HTML (for pages).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::helpers::{anchor_open, html_escape, image_tag};

/// Markup that templates emit without escaping.
///
/// Values of this type originate from the configured content API, which is
/// trusted to deliver sanitized markup. No sanitization happens in this
/// crate: anything wrapped here is rendered verbatim with Tera's `safe`
/// filter, so only construct it from gateway content or from our own
/// serializer output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TrustedHtml(String);

impl TrustedHtml {
    /// Wrap markup received from the trusted content API
    pub fn from_gateway(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TrustedHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An inline annotation over a block's text.
///
/// Offsets count UTF-16 code units, as the API produces them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// A single rich text block (paragraph, heading, list item, image, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub spans: Vec<Span>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oembed: Option<serde_json::Value>,
}

impl Block {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            kind: "paragraph".to_string(),
            text: text.into(),
            spans: Vec::new(),
            url: None,
            alt: None,
            oembed: None,
        }
    }

    fn list_tag(&self) -> Option<&'static str> {
        match self.kind.as_str() {
            "list-item" => Some("ul"),
            "o-list-item" => Some("ol"),
            _ => None,
        }
    }
}

/// An ordered sequence of blocks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText(Vec<Block>);

impl RichText {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self(blocks)
    }

    /// Read blocks out of a JSON value, skipping anything that is not a block.
    ///
    /// A value that is not an array yields empty rich text.
    pub fn from_value(value: &serde_json::Value) -> Self {
        let blocks = value
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| match serde_json::from_value::<Block>(item.clone()) {
                        Ok(block) => Some(block),
                        Err(e) => {
                            tracing::debug!("Skipping malformed rich text block: {}", e);
                            None
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self(blocks)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Plain text of every block, joined by a single space
    pub fn as_text(&self) -> String {
        self.0
            .iter()
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Number of whitespace-separated words in the plain text
    pub fn word_count(&self) -> usize {
        self.0
            .iter()
            .map(|block| block.text.split_whitespace().count())
            .sum()
    }

    /// Serialize to HTML, grouping consecutive list items into one list
    pub fn as_html(&self) -> TrustedHtml {
        let mut html = String::new();
        let mut open_list: Option<&'static str> = None;

        for block in &self.0 {
            let list = block.list_tag();
            if list != open_list {
                if let Some(tag) = open_list {
                    html.push_str(&format!("</{}>", tag));
                }
                if let Some(tag) = list {
                    html.push_str(&format!("<{}>", tag));
                }
                open_list = list;
            }
            html.push_str(&block_html(block));
        }

        if let Some(tag) = open_list {
            html.push_str(&format!("</{}>", tag));
        }

        TrustedHtml(html)
    }

    /// Inline markup of every block without block tags, joined by a space.
    ///
    /// Used where a single line of formatted text is expected, such as
    /// section headings.
    pub fn as_inline_html(&self) -> TrustedHtml {
        let html = self
            .0
            .iter()
            .map(|block| inline_html(&block.text, &block.spans))
            .collect::<Vec<_>>()
            .join(" ");
        TrustedHtml(html)
    }
}

fn block_html(block: &Block) -> String {
    match block.kind.as_str() {
        "paragraph" => format!("<p>{}</p>", inline_html(&block.text, &block.spans)),
        "preformatted" => format!("<pre>{}</pre>", inline_html(&block.text, &block.spans)),
        "list-item" | "o-list-item" => {
            format!("<li>{}</li>", inline_html(&block.text, &block.spans))
        }
        "image" => format!(
            r#"<p class="block-img">{}</p>"#,
            image_tag(block.url.as_deref().unwrap_or(""), block.alt.as_deref())
        ),
        "embed" => {
            let oembed = block.oembed.as_ref();
            let embed_url = oembed
                .and_then(|o| o.get("embed_url"))
                .and_then(|v| v.as_str())
                .unwrap_or("");
            let markup = oembed
                .and_then(|o| o.get("html"))
                .and_then(|v| v.as_str())
                .unwrap_or("");
            format!(
                r#"<div data-oembed="{}">{}</div>"#,
                html_escape(embed_url),
                markup
            )
        }
        kind => match heading_level(kind) {
            Some(level) => format!(
                "<h{level}>{}</h{level}>",
                inline_html(&block.text, &block.spans)
            ),
            None => {
                tracing::debug!("Unknown rich text block type {:?}, rendering as paragraph", kind);
                format!("<p>{}</p>", inline_html(&block.text, &block.spans))
            }
        },
    }
}

fn heading_level(kind: &str) -> Option<u8> {
    let level: u8 = kind.strip_prefix("heading")?.parse().ok()?;
    (1..=6).contains(&level).then_some(level)
}

/// Escape `text` and wrap the spanned ranges in their tags.
///
/// Spans are opened in start order (longest first on ties) and closed as soon
/// as their end offset is reached. A span that ends inside a later one splits
/// it: the inner tags are closed with it and reopened right after.
fn inline_html(text: &str, spans: &[Span]) -> String {
    let mut sorted: Vec<&Span> = spans.iter().filter(|s| s.start < s.end).collect();
    sorted.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut out = String::with_capacity(text.len());
    let mut open: Vec<&Span> = Vec::new();
    let mut pending = sorted.into_iter().peekable();
    let mut offset = 0usize;

    for c in text.chars() {
        close_ended(&mut out, &mut open, offset);
        while let Some(span) = pending.next_if(|s| s.start <= offset) {
            out.push_str(&open_tag(span));
            open.push(span);
        }

        match c {
            '\n' => out.push_str("<br />"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
        offset += c.len_utf16();
    }

    while let Some(span) = open.pop() {
        out.push_str(close_tag(span));
    }

    out
}

fn close_ended<'a>(out: &mut String, open: &mut Vec<&'a Span>, offset: usize) {
    let Some(outermost) = open.iter().position(|span| span.end <= offset) else {
        return;
    };
    let closed: Vec<&'a Span> = open.drain(outermost..).collect();
    for span in closed.iter().rev() {
        out.push_str(close_tag(span));
    }
    for span in closed {
        if span.end > offset {
            out.push_str(&open_tag(span));
            open.push(span);
        }
    }
}

fn span_data<'a>(span: &'a Span, key: &str) -> Option<&'a str> {
    span.data.as_ref()?.get(key)?.as_str()
}

fn open_tag(span: &Span) -> String {
    match span.kind.as_str() {
        "strong" => "<strong>".to_string(),
        "em" => "<em>".to_string(),
        "hyperlink" => {
            let href = span_data(span, "url").unwrap_or("");
            let new_tab = span_data(span, "target") == Some("_blank");
            anchor_open(href, new_tab)
        }
        "label" => format!(
            r#"<span class="{}">"#,
            html_escape(span_data(span, "label").unwrap_or(""))
        ),
        _ => "<span>".to_string(),
    }
}

fn close_tag(span: &Span) -> &'static str {
    match span.kind.as_str() {
        "strong" => "</strong>",
        "em" => "</em>",
        "hyperlink" => "</a>",
        _ => "</span>",
    }
}

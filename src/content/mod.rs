//! Content module - raw documents, rich text and normalized posts

mod document;
mod post;
mod richtext;

pub use document::{parse_publication_date, Document, ResultsPage};
pub use post::{estimate_reading_time, Banner, ContentSection, Post, DEFAULT_WORDS_PER_MINUTE};
pub use richtext::{Block, RichText, Span, TrustedHtml};

//! Raw documents and result pages as returned by the content API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A document exactly as the content API delivers it.
///
/// `data` is left untyped; [`crate::content::Post::from_document`] reads the
/// fields it knows about and ignores the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(rename = "type", default)]
    pub doc_type: String,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    #[serde(default)]
    pub last_publication_date: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// One page of a paginated query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsPage<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    /// Fully-formed locator of the following page, `None` once exhausted
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub total_results_size: usize,
}

impl<T> ResultsPage<T> {
    /// Transform every result while keeping the cursor and count hint
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> ResultsPage<U> {
        ResultsPage {
            results: self.results.into_iter().map(f).collect(),
            next_page: self.next_page,
            total_results_size: self.total_results_size,
        }
    }
}

impl<T> Default for ResultsPage<T> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            next_page: None,
            total_results_size: 0,
        }
    }
}

/// Parse a publication timestamp.
///
/// The API writes offsets without a colon (`2021-03-25T19:25:28+0000`);
/// RFC 3339 is accepted as well. Anything else yields `None`.
pub fn parse_publication_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|date| date.with_timezone(&Utc))
        .ok()
}

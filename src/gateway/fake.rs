//! In-memory gateway for tests

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::{ContentGateway, GatewayError, GetOptions, Ordering, PreviewRef, QueryOptions};
use crate::content::{Document, ResultsPage};

/// Serves canned pages and a small catalogue of documents.
///
/// Unfiltered queries return the configured first page. Queries with
/// `after` walk the catalogue sorted by first publication date.
#[derive(Default)]
pub(crate) struct FakeGateway {
    first_page: ResultsPage<Document>,
    pages: HashMap<String, ResultsPage<Document>>,
    failing: HashSet<String>,
    catalogue: Vec<Document>,
    queries: Mutex<Vec<QueryOptions>>,
    fetched: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_first_page(mut self, results: Vec<Document>, next_page: Option<&str>) -> Self {
        self.first_page = page(results, next_page);
        self
    }

    pub fn with_page(mut self, cursor: &str, results: Vec<Document>, next_page: Option<&str>) -> Self {
        self.pages.insert(cursor.to_string(), page(results, next_page));
        self
    }

    pub fn with_failing_page(mut self, cursor: &str) -> Self {
        self.failing.insert(cursor.to_string());
        self
    }

    pub fn with_catalogue(mut self, documents: Vec<Document>) -> Self {
        self.catalogue = documents;
        self
    }

    pub fn queries(&self) -> Vec<QueryOptions> {
        self.queries.lock().unwrap().clone()
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    fn sorted_catalogue(&self, ordering: Ordering) -> Vec<Document> {
        let mut docs = self.catalogue.clone();
        docs.sort_by(|a, b| a.first_publication_date.cmp(&b.first_publication_date));
        if ordering == Ordering::Descending {
            docs.reverse();
        }
        docs
    }
}

fn page(results: Vec<Document>, next_page: Option<&str>) -> ResultsPage<Document> {
    ResultsPage {
        total_results_size: results.len(),
        results,
        next_page: next_page.map(str::to_string),
    }
}

/// A published post document with the given id, uid and publication date
pub(crate) fn document(id: &str, uid: &str, published: &str) -> Document {
    Document {
        id: id.to_string(),
        uid: Some(uid.to_string()),
        doc_type: "posts".to_string(),
        lang: Some("pt-br".to_string()),
        first_publication_date: Some(published.to_string()),
        last_publication_date: Some(published.to_string()),
        data: serde_json::json!({
            "title": format!("Post {}", id),
            "subtitle": format!("Subtitle {}", id),
            "author": "Author",
            "banner": {"url": format!("https://images.example.com/{}.png", id)},
            "content": [{
                "heading": format!("Heading {}", id),
                "body": [{"type": "paragraph", "text": "Lorem ipsum dolor", "spans": []}]
            }]
        }),
    }
}

#[async_trait]
impl ContentGateway for FakeGateway {
    async fn query_by_type(
        &self,
        _document_type: &str,
        options: &QueryOptions,
    ) -> Result<ResultsPage<Document>, GatewayError> {
        self.queries.lock().unwrap().push(options.clone());

        let Some(after) = &options.after else {
            return Ok(self.first_page.clone());
        };

        let docs = self.sorted_catalogue(options.ordering.unwrap_or(Ordering::Ascending));
        let size = options.page_size.unwrap_or(20) as usize;
        let results: Vec<Document> = docs
            .iter()
            .position(|d| &d.id == after)
            .map(|pos| docs[pos + 1..].iter().take(size).cloned().collect())
            .unwrap_or_default();
        Ok(page(results, None))
    }

    async fn fetch_page(&self, cursor: &str) -> Result<ResultsPage<Document>, GatewayError> {
        self.fetched.lock().unwrap().push(cursor.to_string());
        if self.failing.contains(cursor) {
            return Err(GatewayError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        self.pages.get(cursor).cloned().ok_or(GatewayError::Status {
            status: 404,
            body: format!("no page {}", cursor),
        })
    }

    async fn get_by_uid(
        &self,
        _document_type: &str,
        uid: &str,
        _options: &GetOptions,
    ) -> Result<Option<Document>, GatewayError> {
        Ok(self
            .catalogue
            .iter()
            .find(|d| d.uid.as_deref() == Some(uid))
            .cloned())
    }

    async fn get_by_id(
        &self,
        id: &str,
        _preview_ref: Option<&PreviewRef>,
    ) -> Result<Option<Document>, GatewayError> {
        Ok(self.catalogue.iter().find(|d| d.id == id).cloned())
    }
}

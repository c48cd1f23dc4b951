//! HTTP client for Prismic-style content APIs

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use url::Url;

use super::{ContentGateway, GatewayError, GetOptions, PreviewRef, QueryOptions};
use crate::content::{Document, ResultsPage};

/// How long a looked-up master ref is reused before asking again
const MASTER_REF_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct ApiInfo {
    #[serde(default)]
    refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(rename = "isMasterRef", default)]
    is_master_ref: bool,
}

/// Content API client
pub struct PrismicClient {
    http: Client,
    endpoint: Url,
    access_token: Option<String>,
    master_ref: RwLock<Option<(String, Instant)>>,
}

impl PrismicClient {
    /// Create a client for an API root such as `https://repo.cdn.prismic.io/api/v2`
    pub fn new(endpoint: &str, access_token: Option<String>) -> Result<Self, GatewayError> {
        let endpoint = Url::parse(endpoint)?;
        if endpoint.cannot_be_a_base() {
            return Err(GatewayError::InvalidEndpoint(endpoint.to_string()));
        }
        let http = Client::builder().user_agent(Self::user_agent()).build()?;
        Ok(Self {
            http,
            endpoint,
            access_token: access_token.filter(|t| !t.is_empty()),
            master_ref: RwLock::new(None),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("spacetraveling/", env!("CARGO_PKG_VERSION"))
    }

    async fn master_ref(&self) -> Result<String, GatewayError> {
        {
            let cached = self.master_ref.read().await;
            if let Some((reference, fetched_at)) = cached.as_ref() {
                if fetched_at.elapsed() < MASTER_REF_TTL {
                    return Ok(reference.clone());
                }
            }
        }

        let mut url = self.endpoint.clone();
        if let Some(token) = &self.access_token {
            url.query_pairs_mut().append_pair("access_token", token);
        }
        let api: ApiInfo = self.get_json(url).await?;
        let reference = api
            .refs
            .into_iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference)
            .ok_or(GatewayError::MissingMasterRef)?;

        tracing::debug!("Using master ref {}", reference);
        *self.master_ref.write().await = Some((reference.clone(), Instant::now()));
        Ok(reference)
    }

    async fn resolve_ref(&self, preview: Option<&PreviewRef>) -> Result<String, GatewayError> {
        match preview {
            Some(preview) => Ok(preview.as_str().to_string()),
            None => self.master_ref().await,
        }
    }

    fn search_url(
        &self,
        reference: &str,
        predicates: &str,
        params: &[(&str, String)],
    ) -> Result<Url, GatewayError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::InvalidEndpoint(self.endpoint.to_string()))?
            .pop_if_empty()
            .extend(["documents", "search"]);

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("ref", reference);
            query.append_pair("q", predicates);
            for (key, value) in params {
                query.append_pair(key, value);
            }
            if let Some(token) = &self.access_token {
                query.append_pair("access_token", token);
            }
        }

        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, GatewayError> {
        // The query string may carry the access token, so only the path is logged
        tracing::debug!("GET {}", url.path());

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn first_match(
        &self,
        predicates: String,
        lang: Option<&str>,
        preview: Option<&PreviewRef>,
    ) -> Result<Option<Document>, GatewayError> {
        let reference = self.resolve_ref(preview).await?;
        let mut params = vec![("pageSize", "1".to_string())];
        if let Some(lang) = lang {
            params.push(("lang", lang.to_string()));
        }
        let url = self.search_url(&reference, &predicates, &params)?;
        let page: ResultsPage<Document> = self.get_json(url).await?;
        Ok(page.results.into_iter().next())
    }
}

#[async_trait]
impl ContentGateway for PrismicClient {
    async fn query_by_type(
        &self,
        document_type: &str,
        options: &QueryOptions,
    ) -> Result<ResultsPage<Document>, GatewayError> {
        let reference = self.resolve_ref(options.preview_ref.as_ref()).await?;

        let mut params = Vec::new();
        if let Some(size) = options.page_size {
            params.push(("pageSize", size.to_string()));
        }
        if let Some(ordering) = options.ordering {
            params.push(("orderings", ordering.as_query().to_string()));
        }
        if let Some(after) = &options.after {
            params.push(("after", after.clone()));
        }
        if let Some(lang) = &options.lang {
            params.push(("lang", lang.clone()));
        }

        let url = self.search_url(&reference, &type_predicate(document_type), &params)?;
        self.get_json(url).await
    }

    async fn fetch_page(&self, cursor: &str) -> Result<ResultsPage<Document>, GatewayError> {
        let mut url = Url::parse(cursor)?;
        // Public cursors have the token stripped; put ours back, but only
        // for our own API
        if let Some(token) = &self.access_token {
            let same_origin = url.origin() == self.endpoint.origin();
            if same_origin && !url.query_pairs().any(|(key, _)| key == "access_token") {
                url.query_pairs_mut().append_pair("access_token", token);
            }
        }
        self.get_json(url).await
    }

    async fn get_by_uid(
        &self,
        document_type: &str,
        uid: &str,
        options: &GetOptions,
    ) -> Result<Option<Document>, GatewayError> {
        let predicates = format!(
            "{}[[at(my.{}.uid, {})]]",
            type_predicate(document_type),
            document_type,
            quote(uid)
        );
        self.first_match(predicates, options.lang.as_deref(), options.preview_ref.as_ref())
            .await
    }

    async fn get_by_id(
        &self,
        id: &str,
        preview_ref: Option<&PreviewRef>,
    ) -> Result<Option<Document>, GatewayError> {
        let predicates = format!("[[at(document.id, {})]]", quote(id));
        // Previews may target any locale
        self.first_match(predicates, Some("*"), preview_ref).await
    }
}

fn type_predicate(document_type: &str) -> String {
    format!("[[at(document.type, {})]]", quote(document_type))
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

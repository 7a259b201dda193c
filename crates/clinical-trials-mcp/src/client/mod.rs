//! Upstream HTTP access.
//!
//! Provides:
//! - A fetch gateway issuing one JSON GET with a hard deadline
//! - Classification of transport and HTTP failures into [`ErrorCode`]s
//! - A response cache with request coalescing in front of the gateway
//! - Endpoint helpers for the trials registry and the literature index

pub mod cache;
mod middleware;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, RETRY_AFTER};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde_json::Value;
use url::Url;

pub use cache::{CacheStats, ResponseCache};
pub use middleware::TracingMiddleware;

use crate::config::{Config, api};
use crate::error::{ErrorCode, ToolError, ToolResult, UpstreamService, body_excerpt};
use crate::query::{PubmedSearch, TrialQuery};

const JSON_MEDIA_TYPE: &str = "application/json";

/// Single-GET fetch gateway fronted by the response cache.
#[derive(Clone)]
pub struct HttpGateway {
    client: ClientWithMiddleware,
    cache: ResponseCache,
    timeout: Duration,
}

impl HttpGateway {
    /// Create a gateway from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("clinical-trials-mcp/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        let client = ClientBuilder::new(client).with(TracingMiddleware).build();

        Ok(Self { client, cache: ResponseCache::from_config(config), timeout: config.request_timeout })
    }

    #[must_use]
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Fetch a JSON document through the cache.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the underlying exchange.
    pub async fn get_json(
        &self,
        service: UpstreamService,
        url: Url,
        ttl: Option<Duration>,
    ) -> ToolResult<Arc<Value>> {
        let key = cache_key(service, &url, &[("accept", JSON_MEDIA_TYPE)]);
        let client = self.client.clone();
        let timeout = self.timeout;

        self.cache.get_or_fetch(key, ttl, move || fetch_json(client, service, url, timeout)).await
    }
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("timeout", &self.timeout)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

/// Perform one GET and classify the outcome. The deadline covers the whole
/// exchange including the body read.
async fn fetch_json(
    client: ClientWithMiddleware,
    service: UpstreamService,
    url: Url,
    timeout: Duration,
) -> ToolResult<Value> {
    let endpoint = url.to_string();

    let exchange = async {
        let response = client.get(url).header(ACCEPT, JSON_MEDIA_TYPE).send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let body = response.text().await?;
        Ok::<_, reqwest_middleware::Error>(RawResponse { status, content_type, retry_after, body })
    };

    let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
    match tokio::time::timeout(timeout, exchange).await {
        Err(_) => Err(ToolError::upstream(ErrorCode::Timeout, service, endpoint)
            .with_context("timeout_ms", timeout_ms)),
        Ok(Err(err)) => Err(transport_error(service, endpoint, &err, timeout_ms)),
        Ok(Ok(raw)) => classify_response(service, &endpoint, raw),
    }
}

fn transport_error(
    service: UpstreamService,
    endpoint: String,
    err: &reqwest_middleware::Error,
    timeout_ms: u64,
) -> ToolError {
    if let reqwest_middleware::Error::Reqwest(inner) = err
        && inner.is_timeout()
    {
        return ToolError::upstream(ErrorCode::Timeout, service, endpoint)
            .with_context("timeout_ms", timeout_ms);
    }

    ToolError::upstream(ErrorCode::UpstreamError, service, endpoint)
        .with_context("error", err.to_string())
}

/// Status line, headers of interest and body of a completed exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: String,
    pub retry_after: Option<u64>,
    pub body: String,
}

/// Map a completed exchange onto success or the error taxonomy.
///
/// # Errors
///
/// Non-2xx statuses, non-JSON content types and unparseable bodies.
pub fn classify_response(
    service: UpstreamService,
    endpoint: &str,
    raw: RawResponse,
) -> ToolResult<Value> {
    let failure = |code: ErrorCode| {
        ToolError::upstream(code, service, endpoint)
            .with_status(raw.status)
            .with_context("content_type", raw.content_type.as_str())
            .with_context("body", body_excerpt(&raw.body))
    };

    if !(200..300).contains(&raw.status) {
        let err = match raw.status {
            400 | 422 => failure(ErrorCode::InvalidArgument),
            404 => failure(ErrorCode::NotFound),
            429 => {
                let err = failure(ErrorCode::RateLimited);
                match raw.retry_after {
                    Some(secs) => err.with_context("retry_after_seconds", secs),
                    None => err,
                }
            }
            _ => failure(ErrorCode::UpstreamError),
        };
        return Err(err);
    }

    if !raw.content_type.to_ascii_lowercase().contains(JSON_MEDIA_TYPE) {
        return Err(failure(ErrorCode::UpstreamError).with_context("reason", "non-JSON content type"));
    }

    serde_json::from_str(&raw.body).map_err(|err| {
        failure(ErrorCode::UpstreamError).with_context("parse_error", err.to_string())
    })
}

/// Canonical request signature.
///
/// Query pairs are sorted so parameter order never splits the cache, header
/// names are compared case-insensitively.
#[must_use]
pub fn cache_key(service: UpstreamService, url: &Url, headers: &[(&str, &str)]) -> String {
    use md5::{Digest, Md5};

    let mut pairs: Vec<(String, String)> =
        url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect();
    pairs.sort();

    let mut base = url.clone();
    base.set_query(None);
    base.set_fragment(None);

    let mut header_pairs: Vec<(String, String)> =
        headers.iter().map(|(k, v)| (k.to_ascii_lowercase(), v.trim().to_string())).collect();
    header_pairs.sort();

    let mut hasher = Md5::new();
    hasher.update(service.as_str().as_bytes());
    hasher.update(b"|");
    hasher.update(base.as_str().as_bytes());
    hasher.update(b"|");
    for (k, v) in &pairs {
        hasher.update(k.as_bytes());
        hasher.update(b"=");
        hasher.update(v.as_bytes());
        hasher.update(b"&");
    }
    hasher.update(b"|");
    for (k, v) in &header_pairs {
        hasher.update(k.as_bytes());
        hasher.update(b":");
        hasher.update(v.as_bytes());
        hasher.update(b";");
    }

    format!("{:x}", hasher.finalize())
}

/// Endpoint helpers for both upstreams.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    gateway: HttpGateway,
    ctgov_api_url: String,
    pubmed_api_url: String,
}

impl RegistryClient {
    /// Create a client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            gateway: HttpGateway::new(config)?,
            ctgov_api_url: config.ctgov_api_url.trim_end_matches('/').to_string(),
            pubmed_api_url: config.pubmed_api_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn gateway(&self) -> &HttpGateway {
        &self.gateway
    }

    /// Search studies with a built query.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn search_studies(&self, query: &TrialQuery) -> ToolResult<Arc<Value>> {
        let url = build_url(&format!("{}/studies", self.ctgov_api_url), &query.to_params())?;
        self.gateway.get_json(UpstreamService::ClinicaltrialsGov, url, None).await
    }

    /// Single-study endpoint URL.
    #[must_use]
    pub fn study_endpoint(&self, nct_id: &str) -> String {
        format!("{}/studies/{}", self.ctgov_api_url, nct_id)
    }

    /// Fetch one study record. `nct_id` must already be validated.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn get_study(&self, nct_id: &str) -> ToolResult<Arc<Value>> {
        let url = build_url(&self.study_endpoint(nct_id), &[])?;
        self.gateway.get_json(UpstreamService::ClinicaltrialsGov, url, None).await
    }

    /// Step one of a literature search: matching identifiers.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn esearch(&self, search: &PubmedSearch) -> ToolResult<Arc<Value>> {
        let url = build_url(&format!("{}/esearch.fcgi", self.pubmed_api_url), &search.to_params())?;
        self.gateway.get_json(UpstreamService::Pubmed, url, None).await
    }

    /// Step two of a literature search: summaries for identifiers.
    ///
    /// # Errors
    ///
    /// Returns error on API failure.
    pub async fn esummary(&self, ids: &[String]) -> ToolResult<Arc<Value>> {
        let params = vec![
            ("db", "pubmed".to_string()),
            ("id", ids.join(",")),
            ("retmode", "json".to_string()),
        ];
        let url = build_url(&format!("{}/esummary.fcgi", self.pubmed_api_url), &params)?;
        self.gateway.get_json(UpstreamService::Pubmed, url, None).await
    }
}

fn build_url(endpoint: &str, params: &[(&str, String)]) -> ToolResult<Url> {
    let url = if params.is_empty() {
        Url::parse(endpoint)
    } else {
        Url::parse_with_params(endpoint, params.iter().map(|(k, v)| (*k, v.as_str())))
    };
    url.map_err(|err| ToolError::internal(format!("invalid endpoint {endpoint}: {err}")))
}

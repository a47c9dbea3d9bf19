//! HTTP fetch capability used by the scraper.
//!
//! The scraper only needs "GET a url with some headers, give me the status
//! and body", so that is the whole `HttpFetch` surface. Non-success statuses
//! are returned to the caller, which decides whether they are fatal; only
//! transport failures become errors.

#[cfg(test)]
pub(crate) mod stub;

use reqwest::header::{self, HeaderMap};
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};

use roster_core::{AppConfig, Error};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "roster/0.1")
    pub user_agent: String,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "roster/0.1".to_string(), timeout: Duration::from_millis(20000), max_redirects: 5 }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), timeout: config.timeout(), ..Default::default() }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The final URL after redirects
    pub url: String,
    /// HTTP status code
    pub status: StatusCode,
    /// Response body decoded as text
    pub body: String,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Outbound GET capability.
#[async_trait::async_trait]
pub trait HttpFetch: Send + Sync {
    /// GET `url` with the given extra headers.
    async fn get(&self, url: &str, headers: HeaderMap) -> Result<FetchResponse, Error>;
}

/// reqwest-backed fetch client.
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl HttpFetch for FetchClient {
    async fn get(&self, url: &str, headers: HeaderMap) -> Result<FetchResponse, Error> {
        let start = Instant::now();

        let mut request = self.http.get(url).headers(headers.clone());
        if !headers.contains_key(header::ACCEPT) {
            request = request.header(header::ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8");
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::HttpError(format!("timeout fetching {url}: {e}"))
            } else {
                Error::HttpError(format!("network error: {e}"))
            }
        })?;

        let status = response.status();
        let final_url = response.url().to_string();

        let body = response
            .text()
            .await
            .map_err(|e| Error::HttpError(format!("failed to read response: {}", e)))?;

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!("fetched {} -> {} ({}) in {}ms ({} bytes)", url, final_url, status, fetch_ms, body.len());

        Ok(FetchResponse { url: final_url, status, body, fetch_ms })
    }
}

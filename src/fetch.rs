//! Fetching result pages.
//!
//! [`Fetcher`] is the seam the aggregator depends on. [`HttpFetcher`] is the
//! real implementation: a reqwest client routed through a SOCKS5 proxy and
//! backed by the on-disk [`ResponseCache`].

use crate::cache::{default_cache_path, ResponseCache};
use crate::error::{PubcountError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};
use url::Url;

/// User agent string for requests
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Retrieves the body of a result page.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url` and return the raw response body
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Check that a URL is fit to fetch: longer than 10 characters, https, parseable.
pub fn validate_url(url: &str) -> Result<()> {
    if url.len() <= 10 {
        return Err(PubcountError::InvalidInput(format!(
            "URL must be gt 10 in length: '{}'",
            url
        )));
    }
    if !url.starts_with("https") {
        return Err(PubcountError::InvalidInput(format!(
            "URL must be https: '{}'",
            url
        )));
    }
    Url::parse(url)
        .map_err(|e| PubcountError::InvalidInput(format!("Invalid URL '{}': {}", url, e)))?;
    Ok(())
}

/// SOCKS5 proxy endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
}

impl ProxyConfig {
    pub fn url(&self) -> String {
        format!("socks5://{}:{}", self.host, self.port)
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9050,
        }
    }
}

/// Configuration for [`HttpFetcher`]
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Proxy every request through this SOCKS5 endpoint
    pub proxy: Option<ProxyConfig>,
    /// Cache file location
    pub cache_path: PathBuf,
    /// How long a cached body stays fresh
    pub cache_ttl: chrono::Duration,
    /// Disable to always hit the network
    pub use_cache: bool,
    /// Per-request timeout
    pub timeout: Duration,
    /// Upper bound of the random pause before each network request, in ms
    pub courtesy_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            proxy: Some(ProxyConfig::default()),
            cache_path: default_cache_path()
                .unwrap_or_else(|_| PathBuf::from(".pubcount_cache.json")),
            cache_ttl: chrono::Duration::days(1),
            use_cache: true,
            timeout: Duration::from_secs(30),
            courtesy_delay_ms: 1000,
        }
    }
}

/// HTTP fetcher with response caching and optional proxy
pub struct HttpFetcher {
    client: reqwest::Client,
    cache: Option<Mutex<ResponseCache>>,
    courtesy_delay_ms: u64,
}

impl HttpFetcher {
    /// Build the HTTP client and open the response cache
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = build_http_client(config.proxy.as_ref(), config.timeout)?;
        let cache = config
            .use_cache
            .then(|| Mutex::new(ResponseCache::open(config.cache_path, config.cache_ttl)));

        Ok(Self {
            client,
            cache,
            courtesy_delay_ms: config.courtesy_delay_ms,
        })
    }

    async fn fetch_remote(&self, url: &str) -> Result<String> {
        if self.courtesy_delay_ms > 0 {
            let delay = rand::random::<u64>() % self.courtesy_delay_ms;
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        let response = self
            .client
            .get(url)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PubcountError::RateLimited(60));
        }

        if !status.is_success() {
            return Err(PubcountError::Api {
                code: status.as_u16() as i32,
                message: format!("HTTP error: {}", status),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        validate_url(url)?;

        if let Some(cache) = &self.cache {
            if let Some(body) = cache.lock().await.get(url) {
                debug!(url, "Cache hit");
                return Ok(body.to_string());
            }
        }

        info!(url, "Fetching");
        let body = self.fetch_remote(url).await?;
        debug!(url, bytes = body.len(), "Fetched page");

        if let Some(cache) = &self.cache {
            let mut cache = cache.lock().await;
            cache.insert(url, &body);
            cache.save()?;
        }

        Ok(body)
    }
}

/// Build HTTP client with optional proxy
fn build_http_client(proxy: Option<&ProxyConfig>, timeout: Duration) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout);

    if let Some(proxy) = proxy {
        let proxy_url = proxy.url();
        let proxy = reqwest::Proxy::all(&proxy_url).map_err(|e| {
            PubcountError::Config(format!("Invalid proxy URL '{}': {}", proxy_url, e))
        })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| PubcountError::Config(format!("Failed to build HTTP client: {}", e)))
}

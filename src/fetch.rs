//! Browser-like HTTP client for embed-site probing.
//!
//! Embed hosts routinely reject requests that do not look like a real
//! browser, so every request carries a realistic Chrome header set and
//! a referer pointing at the aggregator page. One client is shared by
//! all extractors; connections are pooled by reqwest.

use std::time::Duration;

use rand::seq::SliceRandom;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use tracing::debug;

use crate::error::{ResolveError, Result};

/// Recent Chrome builds with real market share; one is picked per client.
const CHROME_VERSIONS: &[&str] = &["131.0.0.0", "130.0.0.0", "129.0.0.0", "127.0.0.0", "120.0.0.0"];

/// Referer most embed hosts expect to see.
const DEFAULT_REFERER: &str = "https://multiembed.mov/";

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// HTTP client with a browser fingerprint, shared across extractors.
#[derive(Debug, Clone)]
pub struct EmbedClient {
    client: Client,
    user_agent: String,
}

impl EmbedClient {
    /// Build a client with a randomly chosen Chrome fingerprint.
    pub fn new() -> Result<Self> {
        let version = CHROME_VERSIONS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or("120.0.0.0");
        Self::with_chrome_version(version)
    }

    fn with_chrome_version(version: &str) -> Result<Self> {
        let user_agent = format!(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{version} Safari/537.36"
        );

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(&user_agent).map_err(to_config)?);
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(REFERER, HeaderValue::from_static(DEFAULT_REFERER));
        headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));
        headers.insert("Sec-Fetch-Dest", HeaderValue::from_static("document"));
        headers.insert("Sec-Fetch-Mode", HeaderValue::from_static("navigate"));
        headers.insert("Sec-Fetch-Site", HeaderValue::from_static("cross-site"));

        let client = Client::builder()
            .default_headers(headers)
            .use_rustls_tls()
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .cookie_store(true)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .connect_timeout(Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self { client, user_agent })
    }

    /// Fetch a page and return its body, bounded by `timeout`.
    ///
    /// Non-2xx statuses are an error: an embed host that answers 403/404
    /// has nothing worth scanning.
    pub async fn fetch_text(&self, url: &str, timeout: Duration) -> Result<String> {
        let response = self.get(url, timeout).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::Network(format!("{url}: HTTP {status}")));
        }
        let text = response.text().await?;
        debug!(url, bytes = text.len(), "page fetched");
        Ok(text)
    }

    /// Issue a GET without consuming the body.
    pub async fn get(&self, url: &str, timeout: Duration) -> Result<Response> {
        let response = self.client.get(url).timeout(timeout).send().await?;
        Ok(response)
    }

    /// Cheap HEAD probe. Returns the status and declared content type.
    pub async fn head(&self, url: &str, timeout: Duration) -> Result<(StatusCode, Option<String>)> {
        let response = self.client.head(url).timeout(timeout).send().await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_lowercase());
        Ok((response.status(), content_type))
    }

    /// Read at most `limit` bytes of a response body.
    ///
    /// Used by the validator to sniff playlist magic without downloading
    /// a whole media segment. The connection is dropped once the limit
    /// is reached.
    pub async fn fetch_prefix(&self, url: &str, limit: usize, timeout: Duration) -> Result<Vec<u8>> {
        use futures::StreamExt;

        let response = self.get(url, timeout).await?;
        if !response.status().is_success() {
            return Err(ResolveError::Network(format!(
                "{url}: HTTP {}",
                response.status()
            )));
        }

        let mut buf = Vec::with_capacity(limit.min(4096));
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            buf.extend_from_slice(&chunk);
            if buf.len() >= limit {
                buf.truncate(limit);
                break;
            }
        }
        Ok(buf)
    }

    /// User agent this client presents.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Underlying reqwest client, for collaborators (metadata lookup).
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

fn to_config<E: std::fmt::Display>(err: E) -> ResolveError {
    ResolveError::Config(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_is_chrome() {
        let client = EmbedClient::new().unwrap();
        assert!(client.user_agent().contains("Chrome/"));
        assert!(client.user_agent().starts_with("Mozilla/5.0"));
    }

    #[tokio::test]
    async fn test_fetch_text_rejects_error_status() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = EmbedClient::new().unwrap();
        let err = client
            .fetch_text(&server.uri(), Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::Network(_)));
    }

    #[tokio::test]
    async fn test_fetch_prefix_bounds_read() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'x'; 64 * 1024]))
            .mount(&server)
            .await;

        let client = EmbedClient::new().unwrap();
        let prefix = client
            .fetch_prefix(&server.uri(), 1024, Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(prefix.len(), 1024);
    }
}

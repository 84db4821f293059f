use futures::StreamExt;
use std::future::Future;

use super::fetcher::FetchError;

/// Maximum accepted response body unless the caller configures otherwise.
pub const DEFAULT_MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Status and fully-read body of a GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// The one HTTP capability the retriever needs.
///
/// Implemented for [`reqwest::Client`]; tests swap in doubles that serve
/// canned responses.
pub trait HttpClient: Send + Sync {
    /// Issue a GET for `url`. Non-200 statuses are returned as a normal
    /// response; only transport-level problems are errors.
    fn get(&self, url: &str) -> impl Future<Output = Result<HttpResponse, FetchError>> + Send;
}

/// [`reqwest::Client`] with a cap on the body size it will buffer.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    inner: reqwest::Client,
    max_body: usize,
}

impl ReqwestClient {
    pub fn new(inner: reqwest::Client, max_body: usize) -> Self {
        Self { inner, max_body }
    }

    /// Build a client with the default connection settings.
    pub fn build(max_body: usize) -> Result<Self, reqwest::Error> {
        let inner = reqwest::Client::builder()
            .user_agent(concat!("feed-aggregation/", env!("CARGO_PKG_VERSION")))
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(std::time::Duration::from_secs(30))
            .tcp_keepalive(std::time::Duration::from_secs(60))
            .build()?;
        Ok(Self::new(inner, max_body))
    }
}

impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let response = self.inner.get(url).send().await?;
        let status = response.status().as_u16();
        // The body of a failed response is never looked at.
        if status != 200 {
            return Ok(HttpResponse {
                status,
                body: Vec::new(),
            });
        }
        let body = read_limited_bytes(response, self.max_body).await?;
        Ok(HttpResponse { status, body })
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

use crate::feed::client::HttpClient;
use crate::feed::model::{Channel, FeedResult};
use crate::feed::parser::{parse_channel, ParseError};
use futures::stream::{self, StreamExt};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_CONCURRENT: usize = 10;

/// Errors that can occur while downloading and parsing one feed.
///
/// Only [`FetchError::HttpStatus`] is an expected outcome; every other
/// variant is logged as an unexpected failure. All of them end up as a
/// [`FeedResult::Failed`].
#[derive(Debug, Error)]
pub enum FetchError {
    /// Server answered with something other than 200. Displays as the bare
    /// code so it can be shown as the failure reason.
    #[error("{0}")]
    HttpStatus(u16),
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Request exceeded the configured timeout
    #[error("request timed out")]
    Timeout,
    /// Response body exceeded the configured size limit
    #[error("response too large")]
    ResponseTooLarge,
    /// Body is not a usable RSS/Atom document
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl FetchError {
    /// A refusal by the server rather than a fault on the way.
    pub fn is_expected(&self) -> bool {
        matches!(self, Self::HttpStatus(_))
    }
}

/// Downloads feeds through an injected [`HttpClient`] and turns every
/// outcome, good or bad, into a [`FeedResult`].
#[derive(Debug, Clone)]
pub struct FeedRetriever<C> {
    client: C,
    timeout: Duration,
    max_concurrent: usize,
}

impl<C: HttpClient> FeedRetriever<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            timeout: DEFAULT_TIMEOUT,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Number of feeds fetched at once by [`retrieve_all`](Self::retrieve_all).
    /// Zero is treated as one.
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Download and parse the feed at `url`.
    ///
    /// Never fails: a non-200 status yields a failure whose reason is the
    /// status code, anything else yields a failure carrying the error text.
    /// There are no retries.
    pub async fn retrieve(&self, url: &str) -> FeedResult {
        tracing::info!(url = %url, "Downloading feed");

        match self.fetch_channel(url).await {
            Ok(channel) => FeedResult::feed(url, channel),
            Err(e) => {
                if e.is_expected() {
                    tracing::error!(url = %url, code = %e, "Could not download feed");
                } else {
                    tracing::error!(url = %url, error = %e, detail = ?e, "Unexpected failure downloading feed");
                }
                FeedResult::failed(url, e.to_string())
            }
        }
    }

    /// Retrieve every URL, at most `max_concurrent` at a time.
    ///
    /// The returned results are in the order of `urls`, regardless of which
    /// download finished first.
    pub async fn retrieve_all<I, S>(&self, urls: I) -> Vec<FeedResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        stream::iter(urls)
            .map(|url| async move { self.retrieve(url.as_ref()).await })
            .buffered(self.max_concurrent)
            .collect()
            .await
    }

    async fn fetch_channel(&self, url: &str) -> Result<Channel, FetchError> {
        let response = tokio::time::timeout(self.timeout, self.client.get(url))
            .await
            .map_err(|_| FetchError::Timeout)??;

        if response.status != 200 {
            return Err(FetchError::HttpStatus(response.status));
        }

        Ok(parse_channel(&response.body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::client::{HttpResponse, ReqwestClient, DEFAULT_MAX_FEED_SIZE};
    use crate::feed::model::Item;
    use std::collections::HashMap;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Serves canned bodies keyed by request host; unknown hosts get a 404.
    /// Hosts listed in `delays` answer only after sleeping that long.
    #[derive(Default)]
    struct StubClient {
        bodies: HashMap<String, String>,
        delays: HashMap<String, Duration>,
    }

    impl StubClient {
        fn serving(feeds: &[(&str, String)]) -> Self {
            Self {
                bodies: feeds
                    .iter()
                    .map(|(host, body)| (host.to_string(), body.clone()))
                    .collect(),
                delays: HashMap::new(),
            }
        }

        fn delayed(mut self, host: &str, delay: Duration) -> Self {
            self.delays.insert(host.to_string(), delay);
            self
        }
    }

    impl HttpClient for StubClient {
        async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
            let host = url::Url::parse(url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_default();
            if let Some(delay) = self.delays.get(&host) {
                tokio::time::sleep(*delay).await;
            }
            Ok(match self.bodies.get(&host) {
                Some(body) => HttpResponse {
                    status: 200,
                    body: body.clone().into_bytes(),
                },
                None => HttpResponse {
                    status: 404,
                    body: format!("Unknown host: {host}").into_bytes(),
                },
            })
        }
    }

    fn make_xml(channel: &Channel) -> String {
        let items: String = channel
            .items
            .iter()
            .map(|i| format!("<item><title>{}</title><link>{}</link></item>", i.title, i.link))
            .collect();
        format!(
            r#"<rss version="2.0"><channel><title>{}</title><link>{}</link>{}</channel></rss>"#,
            channel.title, channel.link, items
        )
    }

    fn fixtures() -> Vec<(&'static str, Channel)> {
        vec![
            (
                "http://feed-1.invalid/rss.xml",
                Channel {
                    title: "First feed".into(),
                    link: "http://feed-1/".into(),
                    items: vec![Item {
                        title: "First item".into(),
                        link: "#first".into(),
                    }],
                },
            ),
            (
                "http://feed-2.invalid/rss.xml",
                Channel {
                    title: "Second feed".into(),
                    link: "http://feed-2/".into(),
                    items: vec![Item {
                        title: "Second item".into(),
                        link: "#second".into(),
                    }],
                },
            ),
        ]
    }

    fn stub_for_fixtures() -> StubClient {
        let fixtures = fixtures();
        StubClient::serving(&[
            ("feed-1.invalid", make_xml(&fixtures[0].1)),
            ("feed-2.invalid", make_xml(&fixtures[1].1)),
        ])
    }

    #[tokio::test]
    async fn test_retrieve_parses_each_feed() {
        let retriever = FeedRetriever::new(stub_for_fixtures());

        for (source, channel) in fixtures() {
            let result = retriever.retrieve(source).await;
            assert_eq!(result, FeedResult::feed(source, channel));
        }
    }

    #[tokio::test]
    async fn test_response_not_ok_reason_is_status_code() {
        let retriever = FeedRetriever::new(StubClient::default());

        let result = retriever.retrieve("http://missing.invalid/rss.xml").await;

        assert_eq!(
            result,
            FeedResult::failed("http://missing.invalid/rss.xml", "404")
        );
    }

    #[tokio::test]
    async fn test_malformed_body_reason_is_parser_message() {
        let retriever = FeedRetriever::new(StubClient::serving(&[(
            "empty.invalid",
            String::new(),
        )]));

        let result = retriever.retrieve("http://empty.invalid/rss.xml").await;

        let expected = parse_channel(b"").unwrap_err().to_string();
        assert_eq!(
            result,
            FeedResult::failed("http://empty.invalid/rss.xml", expected)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_feed_times_out() {
        let client = stub_for_fixtures().delayed("feed-1.invalid", Duration::from_secs(120));
        let retriever = FeedRetriever::new(client).with_timeout(Duration::from_secs(5));

        let result = retriever.retrieve("http://feed-1.invalid/rss.xml").await;

        assert_eq!(
            result,
            FeedResult::failed("http://feed-1.invalid/rss.xml", "request timed out")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_retrieve_all_keeps_request_order() {
        // The first feed finishes last; results must still come back first.
        let client = stub_for_fixtures().delayed("feed-1.invalid", Duration::from_secs(3));
        let retriever = FeedRetriever::new(client);

        let urls = [
            "http://feed-1.invalid/rss.xml",
            "http://missing.invalid/rss.xml",
            "http://feed-2.invalid/rss.xml",
        ];
        let results = retriever.retrieve_all(urls).await;

        let sources: Vec<_> = results.iter().map(FeedResult::source).collect();
        assert_eq!(sources, urls);
        assert!(!results[0].is_failed());
        assert!(results[1].is_failed());
        assert!(!results[2].is_failed());
    }

    #[tokio::test]
    async fn test_retrieve_all_empty() {
        let retriever = FeedRetriever::new(StubClient::default());
        let results = retriever.retrieve_all(Vec::<String>::new()).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_retrieve_over_http() {
        let fixtures = fixtures();
        let (_, channel) = &fixtures[0];
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rss.xml"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(make_xml(channel))
                    .insert_header("Content-Type", "application/rss+xml"),
            )
            .expect(1) // No retries
            .mount(&mock_server)
            .await;

        let retriever =
            FeedRetriever::new(ReqwestClient::new(reqwest::Client::new(), DEFAULT_MAX_FEED_SIZE));
        let url = format!("{}/rss.xml", mock_server.uri());

        let result = retriever.retrieve(&url).await;
        assert_eq!(result, FeedResult::feed(url, channel.clone()));
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&mock_server)
            .await;

        let retriever =
            FeedRetriever::new(ReqwestClient::new(reqwest::Client::new(), DEFAULT_MAX_FEED_SIZE));
        let url = format!("{}/rss.xml", mock_server.uri());

        let result = retriever.retrieve(&url).await;
        assert_eq!(result, FeedResult::failed(url, "503"));
    }

    #[tokio::test]
    async fn test_other_success_status_counts_as_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        let retriever =
            FeedRetriever::new(ReqwestClient::new(reqwest::Client::new(), DEFAULT_MAX_FEED_SIZE));
        let url = format!("{}/rss.xml", mock_server.uri());

        let result = retriever.retrieve(&url).await;
        assert_eq!(result, FeedResult::failed(url, "204"));
    }

    #[tokio::test]
    async fn test_network_error_becomes_failed_feed() {
        let retriever =
            FeedRetriever::new(ReqwestClient::new(reqwest::Client::new(), DEFAULT_MAX_FEED_SIZE));

        let result = retriever.retrieve("http://127.0.0.1:1/rss.xml").await;

        match result {
            FeedResult::Failed { source, reason } => {
                assert_eq!(source, "http://127.0.0.1:1/rss.xml");
                assert!(reason.starts_with("Request failed"), "reason: {reason}");
            }
            other => panic!("Expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn test_only_status_refusals_are_expected() {
        assert!(FetchError::HttpStatus(404).is_expected());
        assert!(FetchError::HttpStatus(503).is_expected());
        assert!(!FetchError::Timeout.is_expected());
        assert!(!FetchError::ResponseTooLarge.is_expected());
        assert!(!FetchError::Parse(ParseError::Malformed("bad".into())).is_expected());
    }
}

//! Feed retrieval: HTTP download, RSS/Atom parsing, and the result model.
//!
//! - [`model`] - `Item`, `Channel` and the `FeedResult` success/failure enum
//! - [`parser`] - Bytes to `Channel` using the `feed-rs` crate
//! - [`client`] - The `HttpClient` capability and its `reqwest` implementation
//! - [`fetcher`] - `FeedRetriever`: one GET per feed, every failure folded
//!   into a `FeedResult::Failed`
//!
//! # Example
//!
//! ```ignore
//! use feed_aggregation::feed::{FeedRetriever, ReqwestClient, DEFAULT_MAX_FEED_SIZE};
//!
//! let retriever = FeedRetriever::new(ReqwestClient::build(DEFAULT_MAX_FEED_SIZE)?);
//! let results = retriever.retrieve_all(["https://example.com/rss.xml"]).await;
//! ```

mod client;
mod fetcher;
mod model;
mod parser;

pub use client::{HttpClient, HttpResponse, ReqwestClient, DEFAULT_MAX_FEED_SIZE};
pub use fetcher::{FeedRetriever, FetchError, DEFAULT_MAX_CONCURRENT, DEFAULT_TIMEOUT};
pub use model::{Channel, FeedResult, Item};
pub use parser::{parse_channel, ParseError};

//! Aggregates a fixed list of RSS/Atom feeds into one HTML page or JSON
//! document.
//!
//! - [`feed`] - per-feed download and parsing; every failure becomes a
//!   [`feed::FeedResult::Failed`] instead of an error
//! - [`aggregate`] - ordered result collections and the two output formats
//! - [`render`] - the JSON and HTML representations
//! - [`server`] - the `GET /` web front end
//! - [`config`] - the TOML configuration file

pub mod aggregate;
pub mod config;
pub mod feed;
pub mod render;
pub mod server;
pub mod util;

pub use aggregate::{Document, FeedAggregation, FeedSet, OutputFormat};
pub use feed::{Channel, FeedResult, FeedRetriever, Item};

//! Per-result fragments for both output formats, and the page/document
//! containers that wrap them.
//!
//! HTML comes from the askama templates under `templates/`, which escape
//! every interpolated title, link and reason.

use askama::Template;
use serde_json::{json, Value};

use crate::feed::{Channel, FeedResult};

pub const PAGE_TITLE: &str = "Feed Aggregator 2.0";

#[derive(Template)]
#[template(path = "feed_table.html")]
struct FeedTable<'a> {
    channel: &'a Channel,
}

#[derive(Template)]
#[template(path = "failed_feed.html")]
struct FailedFeed<'a> {
    source: &'a str,
    reason: &'a str,
}

#[derive(Template)]
#[template(path = "page.html")]
struct Page<'a> {
    title: &'a str,
    fragments: Vec<String>,
}

/// JSON representation of one result.
pub fn feed_json(result: &FeedResult) -> Value {
    match result {
        FeedResult::Feed { channel, .. } => json!(channel),
        FeedResult::Failed { source, reason } => json!({
            "error": format!("Failed to load {source}: {reason}"),
        }),
    }
}

/// HTML fragment for one result: a table for a feed, a link to the source
/// for a failure.
pub fn feed_html(result: &FeedResult) -> Result<String, askama::Error> {
    match result {
        FeedResult::Feed { channel, .. } => FeedTable { channel }.render(),
        FeedResult::Failed { source, reason } => FailedFeed { source, reason }.render(),
    }
}

/// `{"feeds": [...]}` in input order.
pub fn json_document(results: &[FeedResult]) -> Value {
    json!({ "feeds": results.iter().map(feed_json).collect::<Vec<_>>() })
}

/// Full HTML page with one `<div>` holding every fragment in input order.
pub fn html_page(results: &[FeedResult]) -> Result<String, askama::Error> {
    let fragments = results.iter().map(feed_html).collect::<Result<Vec<_>, _>>()?;
    Page {
        title: PAGE_TITLE,
        fragments,
    }
    .render()
}

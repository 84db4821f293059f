//! Holding resolved feeds and rendering them as one document.
//!
//! [`FeedAggregation`] is the static shape: an ordered, already-resolved
//! collection rendered on demand. [`FeedSet`] adds the live shape, which
//! re-fetches every configured feed for each render pass.

use std::sync::Arc;

use crate::feed::{FeedResult, FeedRetriever, HttpClient};
use crate::render;

/// Which representation to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Html,
    Json,
}

impl OutputFormat {
    /// Interpret the `json` request flag.
    ///
    /// Only presence matters: `?json`, `?json=` and `?json=false` all ask
    /// for JSON. Absent means HTML.
    pub fn from_json_flag(flag: Option<&str>) -> Self {
        match flag {
            Some(_) => Self::Json,
            None => Self::Html,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Html => "text/html; charset=utf-8",
            Self::Json => "application/json",
        }
    }
}

/// A rendered page or JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub format: OutputFormat,
    pub body: String,
}

impl Document {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}

/// An ordered collection of feed results, successes and failures mixed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedAggregation {
    feeds: Vec<FeedResult>,
}

impl FeedAggregation {
    pub fn new(feeds: Vec<FeedResult>) -> Self {
        Self { feeds }
    }

    pub fn feeds(&self) -> &[FeedResult] {
        &self.feeds
    }

    /// Render every result, in order, as an HTML page or a JSON document.
    pub fn render(&self, format: OutputFormat) -> Result<Document, askama::Error> {
        let body = match format {
            OutputFormat::Html => render::html_page(&self.feeds)?,
            OutputFormat::Json => render::json_document(&self.feeds).to_string(),
        };
        Ok(Document { format, body })
    }
}

impl From<Vec<FeedResult>> for FeedAggregation {
    fn from(feeds: Vec<FeedResult>) -> Self {
        Self::new(feeds)
    }
}

/// Where the results for a render pass come from.
pub enum FeedSet<C> {
    /// Resolved once, rendered for the lifetime of the process.
    Static(Arc<FeedAggregation>),
    /// Fetched again for every render pass.
    Live {
        retriever: Arc<FeedRetriever<C>>,
        urls: Arc<[String]>,
    },
}

impl<C> Clone for FeedSet<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Static(aggregation) => Self::Static(Arc::clone(aggregation)),
            Self::Live { retriever, urls } => Self::Live {
                retriever: Arc::clone(retriever),
                urls: Arc::clone(urls),
            },
        }
    }
}

impl<C: HttpClient> FeedSet<C> {
    pub fn fixed(aggregation: FeedAggregation) -> Self {
        Self::Static(Arc::new(aggregation))
    }

    pub fn live(retriever: FeedRetriever<C>, urls: Vec<String>) -> Self {
        Self::Live {
            retriever: Arc::new(retriever),
            urls: urls.into(),
        }
    }

    /// Fetch every URL once and keep the results for good.
    pub async fn resolve_once(retriever: &FeedRetriever<C>, urls: &[String]) -> Self {
        Self::fixed(FeedAggregation::new(retriever.retrieve_all(urls).await))
    }

    /// The aggregation for one render pass.
    pub async fn aggregation(&self) -> Arc<FeedAggregation> {
        match self {
            Self::Static(aggregation) => Arc::clone(aggregation),
            Self::Live { retriever, urls } => {
                let results = retriever.retrieve_all(urls.to_vec()).await;
                Arc::new(FeedAggregation::new(results))
            }
        }
    }
}

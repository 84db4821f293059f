use serde::Serialize;

/// One entry of a parsed feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub title: String,
    pub link: String,
}

/// Feed-level metadata plus its entries, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Channel {
    pub title: String,
    pub link: String,
    pub items: Vec<Item>,
}

/// Outcome of one retrieval attempt.
///
/// Both variants keep the URL the feed was requested from, so a failure can
/// always be traced back to (and linked to) its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedResult {
    /// The feed was downloaded and parsed.
    Feed { source: String, channel: Channel },
    /// The feed could not be loaded. `reason` is the bare status code for
    /// HTTP failures, otherwise the error message.
    Failed { source: String, reason: String },
}

impl FeedResult {
    pub fn feed(source: impl Into<String>, channel: Channel) -> Self {
        Self::Feed {
            source: source.into(),
            channel,
        }
    }

    pub fn failed(source: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            source: source.into(),
            reason: reason.into(),
        }
    }

    /// URL this result was retrieved from.
    pub fn source(&self) -> &str {
        match self {
            Self::Feed { source, .. } | Self::Failed { source, .. } => source,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

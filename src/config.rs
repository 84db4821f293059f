//! `feeds.toml`: the feed list plus server and fetch settings.
//!
//! A missing or empty file gives the defaults. Unknown keys are accepted
//! with a warning.
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::feed::{DEFAULT_MAX_CONCURRENT, DEFAULT_MAX_FEED_SIZE, DEFAULT_TIMEOUT};
use crate::util::validate_feed_url;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid feed URL '{url}': {reason}")]
    InvalidFeedUrl { url: String, reason: String },

    #[error("timeout_secs must be at least 1")]
    ZeroTimeout,

    #[error("No feeds configured")]
    NoFeeds,
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// When feeds are downloaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefreshMode {
    /// Every page request downloads all feeds again.
    #[default]
    PerRequest,
    /// Feeds are downloaded once at startup and served from memory.
    Startup,
}

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Missing keys fall back to `Default::default()`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Feed URLs, in the order they are rendered.
    pub feeds: Vec<String>,

    /// Address the web server listens on.
    pub bind: String,

    pub refresh: RefreshMode,

    /// Per-fetch timeout in seconds.
    pub timeout_secs: u64,

    /// Maximum number of feeds downloaded at once.
    pub max_concurrent: usize,

    /// Maximum accepted feed body in bytes.
    pub max_feed_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feeds: Vec::new(),
            bind: "127.0.0.1:8080".to_string(),
            refresh: RefreshMode::PerRequest,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            max_feed_size: DEFAULT_MAX_FEED_SIZE,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 6] = [
        "feeds",
        "bind",
        "refresh",
        "timeout_secs",
        "max_concurrent",
        "max_feed_size",
    ];

    /// Load configuration from a TOML file, or the defaults when there is
    /// no file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let size = match std::fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };
        if size > Self::MAX_FILE_SIZE {
            return Err(ConfigError::TooLarge(format!(
                "{size} bytes (max {} bytes)",
                Self::MAX_FILE_SIZE
            )));
        }

        let config = Self::parse(&std::fs::read_to_string(path)?)?;
        tracing::info!(path = %path.display(), feeds = config.feeds.len(), "Loaded configuration");
        Ok(config)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        if config.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        config.validate_feeds()?;
        Ok(config)
    }

    /// Append feeds given outside the file (e.g. on the command line).
    pub fn add_feeds(&mut self, feeds: impl IntoIterator<Item = String>) -> Result<(), ConfigError> {
        self.feeds.extend(feeds);
        self.validate_feeds()
    }

    /// Fails with [`ConfigError::NoFeeds`] when there is nothing to aggregate.
    pub fn require_feeds(&self) -> Result<&[String], ConfigError> {
        if self.feeds.is_empty() {
            return Err(ConfigError::NoFeeds);
        }
        Ok(&self.feeds)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate_feeds(&self) -> Result<(), ConfigError> {
        for url in &self.feeds {
            validate_feed_url(url).map_err(|e| ConfigError::InvalidFeedUrl {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

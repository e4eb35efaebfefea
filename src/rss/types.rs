//! RSS types for prwatch.

use std::time::Duration;

/// Maximum feed size in bytes (5MB).
pub const MAX_FEED_SIZE: u64 = 5 * 1024 * 1024;

/// Default lower bound between two polls, in seconds (5 minutes).
pub const DEFAULT_MIN_REFRESH_SECS: u64 = 300;

/// One entry of the polled feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    /// Unique identifier for the item (RSS guid or Atom id).
    pub id: String,
    /// Item title, e.g. `"job #12 broken since build #11"`.
    pub title: String,
    /// Item links in feed order.
    pub links: Vec<String>,
    /// Content body, usually HTML.
    pub content: Option<String>,
}

impl FeedItem {
    /// Create an item with no links and no content.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            links: Vec::new(),
            content: None,
        }
    }

    /// Add a link.
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.links.push(link.into());
        self
    }

    /// Set the content body.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

/// Result of one successful feed fetch.
#[derive(Debug, Clone, Default)]
pub struct FeedSnapshot {
    /// Items in feed order.
    pub items: Vec<FeedItem>,
    /// The feed's time-to-live hint in minutes.
    pub ttl_minutes: Option<u32>,
}

impl FeedSnapshot {
    /// Time until the feed should be fetched again.
    ///
    /// The feed's own `ttl` wins when it is longer than `min_refresh`.
    pub fn refresh_interval(&self, min_refresh: Duration) -> Duration {
        let ttl = self
            .ttl_minutes
            .map(|minutes| Duration::from_secs(u64::from(minutes) * 60))
            .unwrap_or_default();
        ttl.max(min_refresh)
    }
}

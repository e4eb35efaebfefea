//! Feed module for prwatch.
//!
//! This module fetches the CI server's feed and polls it for new items.

pub mod fetcher;
pub mod poller;
pub mod types;

pub use fetcher::{parse_feed, resolve_charset, validate_url, FeedFetcher, FeedSource};
pub use poller::{FeedPoller, PollerState};
pub use types::{FeedItem, FeedSnapshot, DEFAULT_MIN_REFRESH_SECS, MAX_FEED_SIZE};

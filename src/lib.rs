//! prwatch - CI build status relay
//!
//! Polls a Jenkins RSS feed, matches build results to GitHub pull requests
//! and announces them on IRC.

pub mod chat;
pub mod config;
pub mod error;
pub mod github;
pub mod logging;
pub mod notify;
pub mod rss;

pub use chat::{ChatTransport, IrcClient};
pub use config::Config;
pub use error::{PrwatchError, Result};
pub use github::{Enricher, GitHubClient, PullRequestInfo, PullRequestSource};
pub use notify::{
    classify_title, extract_pull_number, notification_queue, BuildStatus, ItemDispatcher,
    Notification, NotificationRelay,
};
pub use rss::{FeedFetcher, FeedItem, FeedPoller, FeedSnapshot, FeedSource, PollerState};

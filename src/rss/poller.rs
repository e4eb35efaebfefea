//! Feed polling loop for prwatch.
//!
//! The poller fetches the feed, hands newly seen items to the
//! [`ItemDispatcher`] and waits for the feed's refresh hint before the next
//! fetch. The first fetch error stops it for good.

use std::collections::HashSet;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, error, info};

use crate::notify::ItemDispatcher;
use crate::rss::fetcher::FeedSource;
use crate::rss::types::FeedItem;
use crate::{PrwatchError, Result};

/// Poller lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    /// Fetching the feed on every refresh interval.
    Polling,
    /// A fetch failed; terminal.
    Stopped,
}

/// Feed poller.
pub struct FeedPoller {
    source: Box<dyn FeedSource>,
    dispatcher: ItemDispatcher,
    min_refresh: Duration,
    seen: HashSet<String>,
    state: PollerState,
}

impl FeedPoller {
    /// Create a poller that never waits less than `min_refresh` between fetches.
    pub fn new(
        source: Box<dyn FeedSource>,
        dispatcher: ItemDispatcher,
        min_refresh: Duration,
    ) -> Self {
        Self {
            source,
            dispatcher,
            min_refresh,
            seen: HashSet::new(),
            state: PollerState::Polling,
        }
    }

    /// Current state.
    pub fn state(&self) -> PollerState {
        self.state
    }

    /// Run until a fetch fails.
    ///
    /// The failure is reported on stderr and the poller moves to
    /// [`PollerState::Stopped`].
    pub async fn run(&mut self) {
        info!(
            "Feed poller started for {} (minimum refresh: {} seconds)",
            self.source.url(),
            self.min_refresh.as_secs()
        );

        while self.state == PollerState::Polling {
            match self.poll_once().await {
                Ok(wait) => {
                    debug!("Next feed fetch in {} seconds", wait.as_secs());
                    sleep(wait).await;
                }
                Err(e) => {
                    eprintln!("{}", fetch_failure_message(self.source.url(), &e));
                    error!("Feed poller stopped: {}", e);
                    self.state = PollerState::Stopped;
                }
            }
        }
    }

    /// Fetch once and dispatch new items.
    ///
    /// Returns the time left until the next fetch is due.
    pub async fn poll_once(&mut self) -> Result<Duration> {
        let started = Instant::now();
        let snapshot = self.source.fetch().await?;
        let interval = snapshot.refresh_interval(self.min_refresh);

        let new_items = self.take_new_items(snapshot.items);
        if new_items.is_empty() {
            debug!("No new feed items");
        } else {
            info!("{} new feed item(s)", new_items.len());
            self.dispatcher.dispatch(new_items).await;
        }

        Ok(interval.saturating_sub(started.elapsed()))
    }

    /// Keep items not present in the previous snapshot, in feed order.
    ///
    /// Only the ids of the current snapshot are remembered, so memory stays
    /// bounded by the feed size.
    fn take_new_items(&mut self, items: Vec<FeedItem>) -> Vec<FeedItem> {
        let current: HashSet<String> = items.iter().map(|item| item.id.clone()).collect();
        let new_items = items
            .into_iter()
            .filter(|item| !self.seen.contains(&item.id))
            .collect();
        self.seen = current;
        new_items
    }
}

/// Diagnostic printed to stderr when a fetch stops the poller.
fn fetch_failure_message(url: &str, error: &PrwatchError) -> String {
    format!("[e] {}: {}", url, error)
}

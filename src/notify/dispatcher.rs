//! Per-batch fan-out of feed items to enrichment tasks.

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use super::extract::{prepare_item, ItemOutcome};
use super::notification::Notification;
use crate::github::Enricher;
use crate::rss::FeedItem;

/// Launch counter threshold per batch. The counter is compared after a task
/// is launched, so one more item than this is launched before stopping.
pub const BURST_LIMIT: usize = 5;

/// What happened to one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Items for which a task was launched.
    pub launched: usize,
    /// Notifications handed to the output queue.
    pub delivered: usize,
    /// Launched items that produced no notification.
    pub skipped: usize,
}

/// Launches one enrichment task per new feed item and waits for the batch.
pub struct ItemDispatcher {
    enricher: Enricher,
    output: mpsc::Sender<Notification>,
    forward_aborted: bool,
}

impl ItemDispatcher {
    /// Create a dispatcher publishing to `output`.
    pub fn new(
        enricher: Enricher,
        output: mpsc::Sender<Notification>,
        forward_aborted: bool,
    ) -> Self {
        Self {
            enricher,
            output,
            forward_aborted,
        }
    }

    /// Process one batch of new items in feed order.
    ///
    /// Returns once every launched task has finished. Items after the burst
    /// limit are ignored.
    pub async fn dispatch(&self, items: Vec<FeedItem>) -> DispatchReport {
        let total = items.len();
        let mut report = DispatchReport::default();
        let mut tasks = JoinSet::new();

        for item in items {
            report.launched += 1;
            let enricher = self.enricher.clone();
            let output = self.output.clone();
            let forward_aborted = self.forward_aborted;
            tasks.spawn(process_item(item, enricher, output, forward_aborted));

            if report.launched > BURST_LIMIT {
                break;
            }
        }

        if total > report.launched {
            debug!(
                "Burst limit reached: {} of {} item(s) ignored",
                total - report.launched,
                total
            );
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(true) => report.delivered += 1,
                Ok(false) => report.skipped += 1,
                Err(e) => {
                    warn!("Item task failed: {}", e);
                    report.skipped += 1;
                }
            }
        }

        report
    }
}

/// Prepare, enrich and publish a single item. Returns whether a
/// notification reached the output queue.
async fn process_item(
    item: FeedItem,
    enricher: Enricher,
    output: mpsc::Sender<Notification>,
    forward_aborted: bool,
) -> bool {
    let notification = match prepare_item(&item, forward_aborted) {
        ItemOutcome::Ready(notification) => notification,
        ItemOutcome::Skipped(reason) => {
            debug!("Feed item {:?} skipped: {:?}", item.title, reason);
            return false;
        }
    };

    let notification = enricher.enrich(notification).await;
    if output.send(notification).await.is_err() {
        warn!("Notification queue closed; dropping notification");
        return false;
    }
    true
}

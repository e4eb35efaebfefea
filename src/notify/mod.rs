//! Notification pipeline for prwatch.
//!
//! Feed items are classified, matched to a pull request, enriched and
//! queued for the relay, which forwards them to chat:
//! - [`classify_title`] maps an item title to a [`BuildStatus`]
//! - [`extract_pull_number`] finds the pull request in the item content
//! - [`ItemDispatcher`] runs one enrichment task per item of a batch
//! - [`NotificationRelay`] drains the queue in order

mod classify;
mod dispatcher;
mod extract;
mod notification;
mod relay;

pub use classify::{classify_title, BuildStatus};
pub use dispatcher::{DispatchReport, ItemDispatcher, BURST_LIMIT};
pub use extract::{extract_pull_number, prepare_item, ItemOutcome, SkipReason};
pub use notification::Notification;
pub use relay::{notification_queue, NotificationRelay, QUEUE_CAPACITY};

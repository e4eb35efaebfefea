//! Turning feed items into notifications.

use super::classify::classify_title;
use super::notification::Notification;
use crate::rss::FeedItem;

/// Marker preceding the pull request number in item content.
const PULL_MARKER: &str = "/pull/";

/// Why a feed item produced no notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The item has no links.
    NoLinks,
    /// The item has no content body.
    NoContent,
    /// The content holds no usable `/pull/<number>"` reference.
    NoPullReference,
    /// The build was aborted and aborted builds are not forwarded.
    Suppressed,
}

/// Outcome of preparing one feed item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// A notification ready for enrichment.
    Ready(Notification),
    /// The item is dropped.
    Skipped(SkipReason),
}

/// Extract the pull request number from HTML such as
/// `<a href="https://github.com/org/repo/pull/42">`.
///
/// Takes the text between the first `/pull/` and the next `"`.
pub fn extract_pull_number(content: &str) -> Option<u64> {
    let start = content.find(PULL_MARKER)? + PULL_MARKER.len();
    let rest = &content[start..];
    let end = rest.find('"')?;
    rest[..end].parse().ok()
}

/// Build the notification for `item`, or say why there is none.
pub fn prepare_item(item: &FeedItem, forward_aborted: bool) -> ItemOutcome {
    let status = classify_title(&item.title);

    let Some(job_url) = item.links.first() else {
        return ItemOutcome::Skipped(SkipReason::NoLinks);
    };
    let Some(content) = item.content.as_deref() else {
        return ItemOutcome::Skipped(SkipReason::NoContent);
    };
    if status.is_suppressed() && !forward_aborted {
        return ItemOutcome::Skipped(SkipReason::Suppressed);
    }
    let Some(id) = extract_pull_number(content) else {
        return ItemOutcome::Skipped(SkipReason::NoPullReference);
    };

    ItemOutcome::Ready(Notification::new(id, job_url.clone(), status))
}

//! Notification enrichment with pull request metadata.

use std::sync::Arc;

use tracing::debug;

use super::PullRequestSource;
use crate::notify::Notification;

/// Fills in title and author of notifications.
///
/// Lookup failures leave the notification unchanged; they are never retried.
#[derive(Clone)]
pub struct Enricher {
    source: Arc<dyn PullRequestSource>,
}

impl Enricher {
    /// Create an enricher backed by `source`.
    pub fn new(source: Arc<dyn PullRequestSource>) -> Self {
        Self { source }
    }

    /// Look up the pull request of `notification` and copy its title and author.
    pub async fn enrich(&self, mut notification: Notification) -> Notification {
        match self.source.pull_request(notification.id).await {
            Ok(info) => {
                notification.title = info.title;
                notification.author = info.author;
            }
            Err(e) => {
                debug!("Enrichment of PR#{} skipped: {}", notification.id, e);
            }
        }
        notification
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::github::PullRequestInfo;
    use crate::notify::BuildStatus;
    use crate::{PrwatchError, Result};

    struct StaticSource;

    #[async_trait]
    impl PullRequestSource for StaticSource {
        async fn pull_request(&self, number: u64) -> Result<PullRequestInfo> {
            if number == 404 {
                return Err(PrwatchError::GitHub("404 Not Found".to_string()));
            }
            Ok(PullRequestInfo {
                number,
                title: "Fix bug".to_string(),
                author: "alice".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_enrich_success() {
        let enricher = Enricher::new(Arc::new(StaticSource));
        let notification = enricher
            .enrich(Notification::new(7, "https://ci/job/3", BuildStatus::NowFixed))
            .await;

        assert_eq!(notification.title, "Fix bug");
        assert_eq!(notification.author, "alice");
        assert_eq!(notification.status, BuildStatus::NowFixed);
    }

    #[tokio::test]
    async fn test_enrich_failure_keeps_notification() {
        let enricher = Enricher::new(Arc::new(StaticSource));
        let notification = enricher
            .enrich(Notification::new(404, "https://ci/job/3", BuildStatus::StillOk))
            .await;

        assert_eq!(notification.id, 404);
        assert!(notification.title.is_empty());
        assert!(notification.author.is_empty());
    }
}

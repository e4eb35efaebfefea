//! Notification relayed to chat.

use super::classify::BuildStatus;

/// IRC bold control code.
const BOLD: char = '\x02';

/// IRC formatting reset control code.
const RESET: char = '\x0F';

/// A pull request build notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Pull request number.
    pub id: u64,
    /// Link to the CI job that triggered the notification.
    pub job_url: String,
    /// Pull request title; empty if enrichment failed.
    pub title: String,
    /// Pull request author login; empty if enrichment failed.
    pub author: String,
    /// Build status.
    pub status: BuildStatus,
}

impl Notification {
    /// Create a notification that has not been enriched yet.
    pub fn new(id: u64, job_url: impl Into<String>, status: BuildStatus) -> Self {
        Self {
            id,
            job_url: job_url.into(),
            title: String::new(),
            author: String::new(),
            status,
        }
    }

    /// Render the message sent to chat and printed on stdout.
    pub fn format(&self) -> String {
        format!(
            "PR#{}({BOLD}{}{RESET}) authored by {BOLD}{}{RESET} is {BOLD}{}{RESET}",
            self.id, self.title, self.author, self.status
        )
    }
}

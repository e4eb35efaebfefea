//! GitHub module for prwatch.
//!
//! Looks up pull request metadata used to enrich build notifications.

mod client;
mod enricher;

use async_trait::async_trait;

use crate::Result;

pub use client::GitHubClient;
pub use enricher::Enricher;

/// Pull request metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequestInfo {
    /// Pull request number.
    pub number: u64,
    /// Pull request title.
    pub title: String,
    /// Author login.
    pub author: String,
}

/// Source of pull request metadata.
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    /// Fetch the pull request with the given number.
    async fn pull_request(&self, number: u64) -> Result<PullRequestInfo>;
}

//! REST client for the GitHub pull request endpoint, scoped to one repository.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::Deserialize;

use super::{PullRequestInfo, PullRequestSource};
use crate::config::GitHubConfig;
use crate::{PrwatchError, Result};

/// Total request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// User agent string; GitHub rejects requests without one.
const USER_AGENT: &str = concat!("prwatch/", env!("CARGO_PKG_VERSION"));

#[derive(Deserialize)]
struct PullRequestResponse {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    user: Option<UserResponse>,
}

#[derive(Deserialize)]
struct UserResponse {
    #[serde(default)]
    login: Option<String>,
}

/// GitHub API client bound to `owner/repo`.
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    api_url: String,
    owner: String,
    repo: String,
}

impl GitHubClient {
    /// Create a client authenticated with `token`.
    pub fn new(
        api_url: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: &str,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| PrwatchError::Validation("GitHub token is not a valid header".into()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| PrwatchError::GitHub(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            owner: owner.into(),
            repo: repo.into(),
        })
    }

    /// Create a client from the GitHub section of the configuration.
    pub fn from_config(config: &GitHubConfig) -> Result<Self> {
        Self::new(
            config.api_url.clone(),
            config.owner.clone(),
            config.repo.clone(),
            &config.token,
        )
    }

    /// Endpoint URL for pull request `number`.
    fn pull_url(&self, number: u64) -> String {
        format!(
            "{}/repos/{}/{}/pulls/{}",
            self.api_url, self.owner, self.repo, number
        )
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_url", &self.api_url)
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PullRequestSource for GitHubClient {
    async fn pull_request(&self, number: u64) -> Result<PullRequestInfo> {
        let response = self
            .client
            .get(self.pull_url(number))
            .send()
            .await
            .map_err(|e| PrwatchError::GitHub(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(PrwatchError::GitHub(format!(
                "pull request #{} lookup failed: {}",
                number,
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| PrwatchError::GitHub(format!("failed to read response: {}", e)))?;

        parse_pull_request(number, &body)
    }
}

/// Decode a pull request response body. Missing fields become empty strings.
fn parse_pull_request(number: u64, body: &[u8]) -> Result<PullRequestInfo> {
    let response: PullRequestResponse = serde_json::from_slice(body)
        .map_err(|e| PrwatchError::GitHub(format!("malformed response: {}", e)))?;

    Ok(PullRequestInfo {
        number,
        title: response.title.unwrap_or_default(),
        author: response
            .user
            .and_then(|user| user.login)
            .unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pull_url() {
        let client =
            GitHubClient::new("https://api.github.com/", "openshift", "origin", "tok").unwrap();
        assert_eq!(
            client.pull_url(42),
            "https://api.github.com/repos/openshift/origin/pulls/42"
        );
    }

    #[test]
    fn test_invalid_token_rejected() {
        assert!(GitHubClient::new("https://api.github.com", "o", "r", "bad\ntoken").is_err());
    }

    #[test]
    fn test_debug_hides_token() {
        let client = GitHubClient::new("https://api.github.com", "o", "r", "s3cr3t").unwrap();
        assert!(!format!("{client:?}").contains("s3cr3t"));
    }

    #[test]
    fn test_parse_pull_request() {
        let body = br#"{"number": 7, "title": "Fix bug", "user": {"login": "alice", "id": 1}, "state": "open"}"#;
        let info = parse_pull_request(7, body).unwrap();
        assert_eq!(
            info,
            PullRequestInfo {
                number: 7,
                title: "Fix bug".to_string(),
                author: "alice".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_pull_request_missing_fields() {
        let info = parse_pull_request(7, br#"{"title": null, "user": null}"#).unwrap();
        assert!(info.title.is_empty());
        assert!(info.author.is_empty());
    }

    #[test]
    fn test_parse_pull_request_malformed() {
        let err = parse_pull_request(7, b"<html>rate limited</html>").unwrap_err();
        assert!(err.to_string().contains("malformed response"));
    }
}

//! Configuration module for prwatch.
//!
//! Settings come from an optional TOML file and are then overridden by
//! environment variables, so the bridge runs with no file at all.

use serde::Deserialize;
use std::path::Path;

use crate::{PrwatchError, Result};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "prwatch.toml";

/// Environment variable naming an alternative configuration file.
pub const CONFIG_PATH_ENV: &str = "PRWATCH_CONFIG";

/// Feed polling configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// URL of the CI server's RSS/Atom feed.
    #[serde(default = "default_feed_url")]
    pub url: String,
    /// Total request timeout in seconds for one feed fetch.
    #[serde(default = "default_feed_timeout")]
    pub timeout_secs: u64,
    /// Lower bound for the wait between two polls, in seconds.
    #[serde(default = "default_min_refresh")]
    pub min_refresh_secs: u64,
    /// Character encoding label forced onto the feed body (e.g. "iso-8859-1").
    #[serde(default)]
    pub charset: Option<String>,
}

fn default_feed_url() -> String {
    "https://ci.openshift.redhat.com/jenkins/job/test_pull_requests_origin/rssAll".to_string()
}

fn default_feed_timeout() -> u64 {
    30
}

fn default_min_refresh() -> u64 {
    crate::rss::DEFAULT_MIN_REFRESH_SECS
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            timeout_secs: default_feed_timeout(),
            min_refresh_secs: default_min_refresh(),
            charset: None,
        }
    }
}

/// GitHub API configuration.
#[derive(Clone, Deserialize)]
pub struct GitHubConfig {
    /// Repository owner (user or organization).
    #[serde(default = "default_repo_owner")]
    pub owner: String,
    /// Repository name.
    #[serde(default = "default_repo_name")]
    pub repo: String,
    /// API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Personal access token. Usually supplied through `GITHUB_TOKEN`.
    #[serde(default)]
    pub token: String,
}

fn default_repo_owner() -> String {
    "openshift".to_string()
}

fn default_repo_name() -> String {
    "origin".to_string()
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("api_url", &self.api_url)
            .field("token_set", &!self.token.is_empty())
            .finish()
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            owner: default_repo_owner(),
            repo: default_repo_name(),
            api_url: default_api_url(),
            token: String::new(),
        }
    }
}

/// IRC configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IrcConfig {
    /// Server address as `host:port`.
    #[serde(default = "default_irc_server")]
    pub server: String,
    /// Channel to join and send notices to.
    #[serde(default = "default_irc_channel")]
    pub channel: String,
    /// Nickname of the bot.
    #[serde(default = "default_irc_nick")]
    pub nick: String,
    /// Seconds to wait for the server to accept the registration.
    #[serde(default = "default_irc_register_timeout")]
    pub register_timeout_secs: u64,
}

fn default_irc_server() -> String {
    "irc.devel.redhat.com:6667".to_string()
}

fn default_irc_channel() -> String {
    "#mfojtik-test".to_string()
}

fn default_irc_nick() -> String {
    "os-jenkins".to_string()
}

fn default_irc_register_timeout() -> u64 {
    60
}

impl Default for IrcConfig {
    fn default() -> Self {
        Self {
            server: default_irc_server(),
            channel: default_irc_channel(),
            nick: default_irc_nick(),
            register_timeout_secs: default_irc_register_timeout(),
        }
    }
}

/// Relay behaviour configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelayConfig {
    /// Forward aborted builds with a blank status instead of dropping them.
    #[serde(default)]
    pub forward_aborted: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional log file, written in addition to stderr.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Feed polling configuration.
    #[serde(default)]
    pub feed: FeedConfig,
    /// GitHub configuration.
    #[serde(default)]
    pub github: GitHubConfig,
    /// IRC configuration.
    #[serde(default)]
    pub irc: IrcConfig,
    /// Relay configuration.
    #[serde(default)]
    pub relay: RelayConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(PrwatchError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration for the running process.
    ///
    /// Reads the file named by `PRWATCH_CONFIG` (or `prwatch.toml`), falling
    /// back to defaults when that file does not exist, then applies
    /// environment overrides.
    pub fn from_environment() -> Result<Self> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        let mut config = match Self::load(&path) {
            Ok(config) => config,
            Err(PrwatchError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Self::default()
            }
            Err(e) => return Err(e),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| PrwatchError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `JENKINS_RSS_URL`: feed URL
    /// - `GITHUB_REPO_ORG`, `GITHUB_REPO_NAME`: target repository
    /// - `GITHUB_TOKEN`: API token
    /// - `IRC_JOIN_CHANNEL`, `IRC_SERVER`, `IRC_NICK`: chat settings
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides using `lookup` to resolve variable names.
    ///
    /// Empty values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let targets: [(&str, &mut String); 7] = [
            ("JENKINS_RSS_URL", &mut self.feed.url),
            ("GITHUB_REPO_ORG", &mut self.github.owner),
            ("GITHUB_REPO_NAME", &mut self.github.repo),
            ("GITHUB_TOKEN", &mut self.github.token),
            ("IRC_JOIN_CHANNEL", &mut self.irc.channel),
            ("IRC_SERVER", &mut self.irc.server),
            ("IRC_NICK", &mut self.irc.nick),
        ];

        for (name, target) in targets {
            if let Some(value) = lookup(name).filter(|v| !v.is_empty()) {
                *target = value;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - The GitHub token is not set
    /// - The feed URL is not an http(s) URL with a host
    /// - The charset override names an unknown encoding
    pub fn validate(&self) -> Result<()> {
        if self.github.token.is_empty() {
            return Err(PrwatchError::Validation(
                "You must set GITHUB_TOKEN. See https://github.com/settings/tokens".to_string(),
            ));
        }

        crate::rss::validate_url(&self.feed.url)?;

        if let Some(label) = &self.feed.charset {
            crate::rss::resolve_charset(label)?;
        }

        Ok(())
    }
}

//! Feed fetcher for the CI server's RSS/Atom feed.
//!
//! This module fetches the feed over HTTP with a size limit and turns it
//! into a [`FeedSnapshot`], optionally forcing a character encoding.

use std::borrow::Cow;
use std::time::Duration;

use async_trait::async_trait;
use encoding_rs::Encoding;
use feed_rs::parser;
use reqwest::Client;

use crate::config::FeedConfig;
use crate::error::{PrwatchError, Result};
use crate::rss::types::{FeedItem, FeedSnapshot, MAX_FEED_SIZE};

/// Connect timeout in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// User agent string for feed fetching.
const USER_AGENT: &str = concat!("prwatch/", env!("CARGO_PKG_VERSION"));

/// A source of feed snapshots.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Location of the feed, used in diagnostics.
    fn url(&self) -> &str;

    /// Fetch and parse the feed once.
    async fn fetch(&self) -> Result<FeedSnapshot>;
}

/// HTTP feed fetcher.
pub struct FeedFetcher {
    client: Client,
    url: String,
    charset: Option<&'static Encoding>,
}

impl FeedFetcher {
    /// Create a fetcher for `url` with a total request `timeout`.
    ///
    /// When `charset` is set the body is decoded with it regardless of
    /// what the document declares.
    pub fn new(
        url: impl Into<String>,
        timeout: Duration,
        charset: Option<&'static Encoding>,
    ) -> Result<Self> {
        let url = url.into();
        validate_url(&url)?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS).min(timeout))
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PrwatchError::Feed(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url,
            charset,
        })
    }

    /// Create a fetcher from the feed section of the configuration.
    pub fn from_config(config: &FeedConfig) -> Result<Self> {
        let charset = config
            .charset
            .as_deref()
            .map(resolve_charset)
            .transpose()?;
        Self::new(
            config.url.clone(),
            Duration::from_secs(config.timeout_secs),
            charset,
        )
    }
}

#[async_trait]
impl FeedSource for FeedFetcher {
    fn url(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<FeedSnapshot> {
        let mut response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| PrwatchError::Feed(format!("failed to fetch feed: {}", e)))?;

        if !response.status().is_success() {
            return Err(PrwatchError::Feed(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > MAX_FEED_SIZE {
                return Err(too_large(content_length));
            }
        }

        // Chunked responses carry no length, so the limit is enforced while reading.
        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| PrwatchError::Feed(format!("failed to read response: {}", e)))?
        {
            let size = (body.len() + chunk.len()) as u64;
            if size > MAX_FEED_SIZE {
                return Err(too_large(size));
            }
            body.extend_from_slice(&chunk);
        }

        parse_feed(&body, self.charset)
    }
}

fn too_large(size: u64) -> PrwatchError {
    PrwatchError::Feed(format!(
        "feed too large: {} bytes (max {} bytes)",
        size, MAX_FEED_SIZE
    ))
}

/// Resolve an encoding label such as `"iso-8859-1"` or `"shift_jis"`.
pub fn resolve_charset(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| PrwatchError::Validation(format!("unknown charset: {}", label)))
}

/// Validate that a feed URL is an http(s) URL with a host.
pub fn validate_url(url: &str) -> Result<()> {
    let parsed =
        url::Url::parse(url).map_err(|e| PrwatchError::Validation(format!("invalid URL: {}", e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(PrwatchError::Validation(format!(
                "unsupported URL scheme: {}",
                scheme
            )));
        }
    }

    if parsed.host().is_none() {
        return Err(PrwatchError::Validation("URL has no host".to_string()));
    }

    Ok(())
}

/// Parse feed bytes into a [`FeedSnapshot`].
pub fn parse_feed(bytes: &[u8], charset: Option<&'static Encoding>) -> Result<FeedSnapshot> {
    let feed = match charset {
        Some(encoding) => {
            let (text, _, _) = encoding.decode(bytes);
            let text = strip_xml_declaration(text);
            parser::parse(text.as_bytes())
        }
        None => parser::parse(bytes),
    }
    .map_err(|e| PrwatchError::Feed(format!("failed to parse feed: {}", e)))?;

    let items = feed
        .entries
        .into_iter()
        .map(|entry| FeedItem {
            id: entry.id,
            title: entry.title.map(|t| t.content).unwrap_or_default(),
            links: entry.links.into_iter().map(|l| l.href).collect(),
            content: entry.content.and_then(|c| c.body),
        })
        .collect();

    Ok(FeedSnapshot {
        items,
        ttl_minutes: feed.ttl,
    })
}

/// Drop a leading `<?xml ...?>` declaration so its encoding attribute
/// cannot contradict text that is already UTF-8.
fn strip_xml_declaration(text: Cow<'_, str>) -> Cow<'_, str> {
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    if trimmed.starts_with("<?xml") {
        if let Some(end) = trimmed.find("?>") {
            return Cow::Owned(trimmed[end + 2..].to_string());
        }
    }
    text
}

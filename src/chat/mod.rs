//! Chat module for prwatch.
//!
//! This module provides the transport notifications are relayed to:
//! - [`ChatTransport`], the seam the relay sends through
//! - [`IrcClient`], a minimal IRC client (register, join, notice, ping/pong)

mod irc;
mod line;

use async_trait::async_trait;

use crate::Result;

pub use irc::IrcClient;
pub use line::IrcLine;

/// Destination for relayed notifications.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send `text` to `channel` as a notice. No reply is expected.
    async fn notice(&self, channel: &str, text: &str) -> Result<()>;
}

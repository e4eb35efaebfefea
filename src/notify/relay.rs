//! Single consumer forwarding notifications to chat.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use super::notification::Notification;
use crate::chat::ChatTransport;

/// Capacity of the notification queue. One slot keeps producers in step
/// with the relay.
pub const QUEUE_CAPACITY: usize = 1;

/// Create the queue between the dispatcher and the relay.
pub fn notification_queue() -> (mpsc::Sender<Notification>, mpsc::Receiver<Notification>) {
    mpsc::channel(QUEUE_CAPACITY)
}

/// Drains the notification queue in order, printing each message and
/// sending it to the chat channel.
pub struct NotificationRelay {
    receiver: mpsc::Receiver<Notification>,
    transport: Arc<dyn ChatTransport>,
    channel: String,
}

impl NotificationRelay {
    /// Create a relay sending notices to `channel`.
    pub fn new(
        receiver: mpsc::Receiver<Notification>,
        transport: Arc<dyn ChatTransport>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            receiver,
            transport,
            channel: channel.into(),
        }
    }

    /// Relay until every sender is gone. Returns the number of messages the
    /// transport accepted.
    ///
    /// Delivery failures are logged and the message is dropped.
    pub async fn run(mut self) -> usize {
        info!("Notification relay started for {}", self.channel);

        let mut delivered = 0;
        let mut failed = 0;
        while let Some(notification) = self.receiver.recv().await {
            let message = notification.format();
            println!("{message}");
            match self.transport.notice(&self.channel, &message).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!("Failed to relay PR#{}: {}", notification.id, e);
                    failed += 1;
                }
            }
        }

        info!(
            "Notification relay stopped: {} delivered, {} failed",
            delivered, failed
        );
        delivered
    }
}

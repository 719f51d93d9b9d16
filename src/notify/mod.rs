//! Notification module
//!
//! Best-effort delivery of wallet mutation summaries to the wallet owner.
//! The channel handle is constructed at startup and injected into the
//! dispatcher; the ledger never waits on, or fails because of, delivery.

mod dispatcher;
mod telegram;

pub use dispatcher::NotificationDispatcher;
pub use telegram::TelegramChannel;

use async_trait::async_trait;

/// Errors raised by a messaging channel
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Invalid destination: {0}")]
    InvalidDestination(String),

    #[error("Channel unreachable: {0}")]
    Unreachable(String),

    #[error("Message rejected ({status}): {description}")]
    Rejected { status: u16, description: String },
}

/// Outbound messaging channel
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Channel name for logging
    fn name(&self) -> &'static str;

    /// Send `text` to `destination`. Called at most once per message.
    async fn send_message(&self, destination: &str, text: &str) -> Result<(), ChannelError>;
}

/// Channel used when no bot is configured: messages only go to the log.
#[derive(Debug, Default, Clone)]
pub struct LogOnlyChannel;

#[async_trait]
impl NotificationChannel for LogOnlyChannel {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send_message(&self, destination: &str, text: &str) -> Result<(), ChannelError> {
        tracing::info!(destination = %destination, text = %text, "Notification (not delivered)");
        Ok(())
    }
}

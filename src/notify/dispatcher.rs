//! Notification Dispatcher
//!
//! Fire-and-forget delivery: each event is handed to a spawned task that
//! tries the channel once. Failures are logged and dropped there.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::domain::NotificationEvent;

use super::NotificationChannel;

#[derive(Clone)]
pub struct NotificationDispatcher {
    channel: Arc<dyn NotificationChannel>,
}

impl NotificationDispatcher {
    pub fn new(channel: Arc<dyn NotificationChannel>) -> Self {
        Self { channel }
    }

    /// Deliver `event` to its wallet owner in the background.
    ///
    /// Returns as soon as the delivery task is spawned. The handle is only
    /// useful to tests; the task never yields an error.
    pub fn dispatch(&self, event: NotificationEvent) -> JoinHandle<()> {
        let channel = Arc::clone(&self.channel);
        let span = tracing::info_span!(
            "notify",
            channel = channel.name(),
            user_id = %event.user_id,
            kind = event.kind.as_str(),
        );

        tokio::spawn(
            async move {
                let text = event.summary();
                match channel.send_message(&event.user_id, &text).await {
                    Ok(()) => tracing::debug!("Notification delivered"),
                    Err(e) => tracing::warn!(error = %e, "Notification delivery failed"),
                }
            }
            .instrument(span),
        )
    }
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("channel", &self.channel.name())
            .finish()
    }
}

//! Notifier that writes events to the tracing log

use tracing::info;

use super::traits::{NotificationEvent, Notifier, NotifyError};

#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, event: &NotificationEvent) -> Result<(), NotifyError> {
        info!(event = event.kind(), "{}", event.subject());
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "log"
    }
}

//! Fire-and-forget delivery to every configured channel
//!
//! Pipelines call `notify` and move on. Individual channel failures are
//! logged and dropped; they never reach the caller.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use super::log_notifier::LogNotifier;
use super::traits::{DispatchResult, NotificationEvent, Notifier};
use super::webhook::WebhookNotifier;
use crate::config::NotificationConfig;
use crate::utils::HttpClientFactory;

#[derive(Clone, Default)]
pub struct NotificationDispatcher {
    channels: Arc<Vec<Arc<dyn Notifier>>>,
}

impl NotificationDispatcher {
    pub fn new(channels: Vec<Arc<dyn Notifier>>) -> Self {
        Self {
            channels: Arc::new(channels),
        }
    }

    /// Dispatcher with no channels; every event is discarded
    pub fn empty() -> Self {
        Self::default()
    }

    /// Log channel always, webhook channel when a URL is configured
    pub fn from_config(config: &NotificationConfig, factory: &HttpClientFactory) -> Self {
        let mut channels: Vec<Arc<dyn Notifier>> = vec![Arc::new(LogNotifier)];

        if let Some(url) = config.webhook_url.as_deref().filter(|url| !url.trim().is_empty()) {
            match WebhookNotifier::from_config(url, config.timeout, factory) {
                Ok(webhook) => channels.push(Arc::new(webhook)),
                Err(e) => warn!("Webhook notifications disabled: {}", e),
            }
        }

        Self::new(channels)
    }

    pub fn channel_names(&self) -> Vec<String> {
        self.channels
            .iter()
            .map(|channel| channel.channel_name().to_string())
            .collect()
    }

    /// Queue `event` for delivery and return immediately
    pub fn notify(&self, event: NotificationEvent) {
        if self.channels.is_empty() {
            return;
        }

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let dispatcher = self.clone();
                handle.spawn(async move {
                    dispatcher.deliver(&event).await;
                });
            }
            Err(_) => debug!("No async runtime; dropping {} notification", event.kind()),
        }
    }

    /// Deliver to every channel in turn, collecting per-channel results
    pub async fn deliver(&self, event: &NotificationEvent) -> Vec<DispatchResult> {
        let mut results = Vec::with_capacity(self.channels.len());

        for channel in self.channels.iter() {
            let start = Instant::now();
            let result = channel.send(event).await;
            let duration_ms = start.elapsed().as_millis() as u64;

            let error = match result {
                Ok(()) => {
                    debug!(
                        event = event.kind(),
                        channel = channel.channel_name(),
                        duration_ms,
                        "Notification delivered"
                    );
                    None
                }
                Err(e) => {
                    warn!(
                        event = event.kind(),
                        channel = channel.channel_name(),
                        error = %e,
                        duration_ms,
                        "Notification delivery failed"
                    );
                    Some(e.to_string())
                }
            };

            results.push(DispatchResult {
                channel: channel.channel_name().to_string(),
                success: error.is_none(),
                error,
                duration_ms,
            });
        }

        results
    }
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("channels", &self.channel_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VerificationSummary;
    use crate::notifications::NotifyError;
    use std::time::Duration;
    use tokio::sync::Mutex;

    struct FailingNotifier;

    #[async_trait::async_trait]
    impl Notifier for FailingNotifier {
        async fn send(&self, _event: &NotificationEvent) -> Result<(), NotifyError> {
            Err(NotifyError::Config("unreachable".to_string()))
        }

        fn channel_name(&self) -> &str {
            "failing"
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        received: Mutex<Vec<NotificationEvent>>,
    }

    #[async_trait::async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, event: &NotificationEvent) -> Result<(), NotifyError> {
            self.received.lock().await.push(event.clone());
            Ok(())
        }

        fn channel_name(&self) -> &str {
            "recording"
        }
    }

    fn event() -> NotificationEvent {
        NotificationEvent::VerificationSummary {
            summary: VerificationSummary::default(),
        }
    }

    #[tokio::test]
    async fn failing_channel_does_not_block_others() {
        let recorder = Arc::new(RecordingNotifier::default());
        let channels: Vec<Arc<dyn Notifier>> = vec![Arc::new(FailingNotifier), recorder.clone()];
        let dispatcher = NotificationDispatcher::new(channels);

        let results = dispatcher.deliver(&event()).await;
        assert_eq!(results.len(), 2);
        assert!(!results[0].success);
        assert!(results[1].success);
        assert_eq!(recorder.received.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn notify_delivers_in_the_background() {
        let recorder = Arc::new(RecordingNotifier::default());
        let channels: Vec<Arc<dyn Notifier>> = vec![recorder.clone()];
        let dispatcher = NotificationDispatcher::new(channels);

        dispatcher.notify(event());

        for _ in 0..50 {
            if !recorder.received.lock().await.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(recorder.received.lock().await.as_slice(), &[event()]);
    }

    #[test]
    fn notify_without_runtime_is_a_no_op() {
        let channels: Vec<Arc<dyn Notifier>> = vec![Arc::new(FailingNotifier)];
        NotificationDispatcher::new(channels).notify(event());
    }

    #[test]
    fn config_without_webhook_only_logs() {
        let dispatcher = NotificationDispatcher::from_config(
            &NotificationConfig::default(),
            &HttpClientFactory::default(),
        );
        assert_eq!(dispatcher.channel_names(), vec!["log"]);
    }
}

//! Generic HTTP webhook notifier
//!
//! Posts each event as JSON: the serialized event plus a `subject` line.

use std::time::Duration;

use reqwest::Client;
use serde_json::json;

use super::traits::{NotificationEvent, Notifier, NotifyError};
use crate::utils::{HttpClientFactory, UrlUtils};

#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    url: String,
    client: Client,
}

impl WebhookNotifier {
    pub fn new(url: String, client: Client) -> Result<Self, NotifyError> {
        if !UrlUtils::is_http_url(&url) {
            return Err(NotifyError::Config(format!("invalid webhook url: {url}")));
        }
        Ok(Self { url, client })
    }

    pub fn from_config(
        url: &str,
        timeout: Duration,
        factory: &HttpClientFactory,
    ) -> Result<Self, NotifyError> {
        let client = factory
            .create_client(timeout)
            .map_err(|e| NotifyError::Config(e.to_string()))?;
        Self::new(url.trim().to_string(), client)
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, event: &NotificationEvent) -> Result<(), NotifyError> {
        let mut body = serde_json::to_value(event)
            .map_err(|e| NotifyError::Config(format!("unserializable event: {e}")))?;
        if let Some(object) = body.as_object_mut() {
            object.insert("subject".to_string(), json!(event.subject()));
        }

        let response = self.client.post(&self.url).json(&body).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(NotifyError::Rejected {
                status: status.as_u16(),
            })
        }
    }

    fn channel_name(&self) -> &str {
        "webhook"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VerificationSummary;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn rejects_non_http_urls() {
        assert!(WebhookNotifier::new("ftp://hooks".to_string(), Client::new()).is_err());
    }

    #[tokio::test]
    async fn posts_tagged_event_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hooks/intake"))
            .and(body_partial_json(json!({"event": "verification_summary", "summary": {"archived": 1}})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let notifier =
            WebhookNotifier::new(format!("{}/hooks/intake", server.uri()), Client::new()).unwrap();
        let event = NotificationEvent::VerificationSummary {
            summary: VerificationSummary {
                processed: 4,
                archived: 1,
                ..Default::default()
            },
        };
        notifier.send(&event).await.unwrap();
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::new(server.uri(), Client::new()).unwrap();
        let event = NotificationEvent::VerificationSummary {
            summary: VerificationSummary::default(),
        };
        let err = notifier.send(&event).await.unwrap_err();
        assert!(matches!(err, NotifyError::Rejected { status: 500 }));
    }
}

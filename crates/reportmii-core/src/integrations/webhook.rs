//! Webhook notifier -- POST wizard events as JSON to a configured URL.

use std::time::Duration;

use reqwest::Client;
use serde_json::json;
use tracing::warn;

use crate::error::IntegrationError;
use crate::events::Event;
use crate::integrations::traits::Notifier;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

pub struct WebhookNotifier {
    webhook_url: String,
    client: Client,
}

impl WebhookNotifier {
    pub fn new(webhook_url: impl Into<String>) -> Result<Self, IntegrationError> {
        let webhook_url = webhook_url.into();
        if webhook_url.trim().is_empty() {
            return Err(IntegrationError::NotConfigured {
                service: "webhook".to_string(),
            });
        }
        url::Url::parse(&webhook_url)?;

        // Requests may run on different runtimes; pooled connections must not
        // outlive the runtime that opened them.
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .pool_max_idle_per_host(0)
            .build()?;
        Ok(Self { webhook_url, client })
    }
}

async fn post(client: &Client, webhook_url: &str, event: &Event) -> Result<(), IntegrationError> {
    let body = json!({
        "event": event.name(),
        "payload": event,
    });
    let resp = client.post(webhook_url).json(&body).send().await?;

    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        let text = resp.text().await.unwrap_or_default();
        Err(IntegrationError::Unavailable {
            service: "webhook".to_string(),
            message: format!("HTTP {status}: {text}"),
        })
    }
}

impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        "webhook"
    }

    /// Deliver the event.
    ///
    /// Inside a tokio runtime the request is spawned onto it and this returns
    /// immediately; delivery failures are then only logged. Without a runtime
    /// the caller blocks until the request finishes or times out.
    fn notify(&self, event: &Event) -> Result<(), IntegrationError> {
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let client = self.client.clone();
            let webhook_url = self.webhook_url.clone();
            let event = event.clone();
            handle.spawn(async move {
                if let Err(e) = post(&client, &webhook_url, &event).await {
                    warn!(url = %webhook_url, error = %e, "webhook delivery failed");
                }
            });
            return Ok(());
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| IntegrationError::Unavailable {
                service: "webhook".to_string(),
                message: e.to_string(),
            })?;
        runtime.block_on(post(&self.client, &self.webhook_url, event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn submitted() -> Event {
        Event::AnalysisSubmitted {
            analysis_id: "a-1".to_string(),
            owner: "ana".to_string(),
            name: "Q3".to_string(),
            active_blocks: 6,
            at: Utc::now(),
        }
    }

    #[test]
    fn test_posts_event_json() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/hook")
            .match_body(mockito::Matcher::PartialJson(json!({
                "event": "AnalysisSubmitted",
                "payload": { "type": "AnalysisSubmitted", "analysis_id": "a-1" }
            })))
            .with_status(204)
            .create();

        let notifier = WebhookNotifier::new(format!("{}/hook", server.url())).unwrap();
        notifier.notify(&submitted()).unwrap();
        mock.assert();
    }

    #[test]
    fn test_http_error_is_reported() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/hook")
            .with_status(500)
            .with_body("boom")
            .create();

        let notifier = WebhookNotifier::new(format!("{}/hook", server.url())).unwrap();
        let err = notifier.notify(&submitted()).unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_notify_inside_runtime_returns_immediately() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .match_body(mockito::Matcher::PartialJson(json!({ "event": "AnalysisSubmitted" })))
            .with_status(204)
            .create_async()
            .await;

        let notifier = WebhookNotifier::new(format!("{}/hook", server.url())).unwrap();
        notifier.notify(&submitted()).unwrap();

        for _ in 0..100 {
            if mock.matched_async().await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        mock.assert_async().await;
    }

    #[test]
    fn test_requires_url() {
        assert!(matches!(
            WebhookNotifier::new(" "),
            Err(IntegrationError::NotConfigured { .. })
        ));
    }
}

use super::envelope::MailEnvelope;
use crate::error::{transport_error, MailcalResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const RELAY_TIMEOUT: Duration = Duration::from_secs(30);

/// Outbound mail delivery
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, envelope: &MailEnvelope) -> MailcalResult<()>;
}

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    raw: String,
}

/// Hands the rendered message to an HTTP mail relay
pub struct HttpRelayTransport {
    client: Client,
    url: Url,
    token: Option<String>,
}

impl HttpRelayTransport {
    pub fn new(url: &str, token: Option<String>) -> MailcalResult<Self> {
        let url = Url::parse(url)
            .map_err(|e| transport_error(&format!("Invalid relay URL '{}': {}", url, e)))?;
        let client = Client::builder()
            .timeout(RELAY_TIMEOUT)
            .build()
            .map_err(|e| transport_error(&format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, url, token })
    }
}

#[async_trait]
impl Transport for HttpRelayTransport {
    async fn send(&self, envelope: &MailEnvelope) -> MailcalResult<()> {
        let body = RelayRequest {
            from: &envelope.from,
            to: &envelope.to,
            subject: &envelope.subject,
            raw: envelope.render(),
        };

        let mut request = self.client.post(self.url.clone()).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(transport_error(&format!(
                "Mail relay rejected message: HTTP {} - {}",
                status, error_body
            )));
        }

        info!("Relayed {} to {}", envelope.message_id, envelope.to);
        Ok(())
    }
}

/// Dry-run transport that only logs what would have been sent
#[derive(Debug, Default)]
pub struct LogTransport;

#[async_trait]
impl Transport for LogTransport {
    async fn send(&self, envelope: &MailEnvelope) -> MailcalResult<()> {
        info!(
            "Dry run, not sending '{}' to {} with attachment {} ({} bytes)",
            envelope.subject,
            envelope.to,
            envelope.attachment.filename,
            envelope.attachment.content.len()
        );
        debug!("Rendered message:\n{}", envelope.render());
        Ok(())
    }
}

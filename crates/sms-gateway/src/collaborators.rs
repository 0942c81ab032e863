//! HTTP-backed text processing and notification
//!
//! The gateway does no message understanding itself; it forwards every
//! inbound SMS to the host's processing service and optionally reports the
//! finished exchange to a notification endpoint.

use async_trait::async_trait;
use reqwest::Client;
use sms_core::{Error, Exchange, Notifier, ProcessOutcome, ProcessRequest, Result, TextProcessor};
use tracing::debug;

/// Posts [`ProcessRequest`] JSON and expects `{"reply": …, "user_id": …}`
pub struct HttpTextProcessor {
    client: Client,
    url: String,
}

impl HttpTextProcessor {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl TextProcessor for HttpTextProcessor {
    async fn process(&self, request: &ProcessRequest) -> Result<ProcessOutcome> {
        debug!(url = %self.url, "Forwarding text to processor");

        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Processing(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Processing(format!("{} - {}", status, text)));
        }

        response
            .json::<ProcessOutcome>()
            .await
            .map_err(|e| Error::Processing(format!("Invalid processor response: {}", e)))
    }
}

/// Posts [`Exchange`] JSON to a notification endpoint
pub struct HttpNotifier {
    client: Client,
    url: String,
}

impl HttpNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify(&self, exchange: &Exchange) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(exchange)
            .send()
            .await
            .map_err(|e| Error::Notification(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Notification(format!(
                "Notification endpoint returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

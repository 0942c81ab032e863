//! Twilio REST API client

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::credentials::Credentials;
use crate::error::{Result, TwilioError};

const DEFAULT_BASE_URL: &str = "https://api.twilio.com";

/// Twilio API client
///
/// Holds no connection state; every call is an independent HTTPS request
/// on a shared pool, so the client can be used from many tasks at once.
#[derive(Debug, Clone)]
pub struct TwilioApi {
    client: Client,
    account_sid: String,
    auth_token: String,
    base_url: String,
}

/// Outgoing message payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendMessagePayload<'a> {
    from: &'a str,
    to: &'a str,
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    sid: String,
}

impl TwilioApi {
    /// Create a client with no request timeout
    pub fn new(credentials: &Credentials) -> Self {
        Self::from_client(Client::new(), credentials)
    }

    /// Create a client whose requests fail after `timeout`
    pub fn with_timeout(credentials: &Credentials, timeout: Option<Duration>) -> Result<Self> {
        let Some(timeout) = timeout else {
            return Ok(Self::new(credentials));
        };

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TwilioError::Config(e.to_string()))?;
        Ok(Self::from_client(client, credentials))
    }

    fn from_client(client: Client, credentials: &Credentials) -> Self {
        Self {
            client,
            account_sid: credentials.account_sid.clone(),
            auth_token: credentials.auth_token.clone(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different API host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn account_sid(&self) -> &str {
        &self.account_sid
    }

    /// Send an SMS and return the message SID
    pub async fn send_message(&self, from: &str, to: &str, body: &str) -> Result<String> {
        info!(to = %to, "Sending SMS via Twilio");

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&SendMessagePayload { from, to, body })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TwilioError::Api { status, body });
        }

        let result: SendMessageResponse = response.json().await?;
        debug!(sid = %result.sid, "Twilio accepted message");
        Ok(result.sid)
    }
}

//! Twilio implementation of the SMS driver interface

use axum::Router;
use sms_core::{FormFields, OpenOptions, SmsConn, SmsDriver, WebhookContext};
use tracing::info;

use crate::api::TwilioApi;
use crate::conn::TwilioConn;
use crate::credentials::Credentials;
use crate::webhook;

/// Registry key of the Twilio driver
pub const DRIVER_NAME: &str = "twilio";

/// Form field names of Twilio's inbound message callback
pub(crate) const FIELDS: FormFields = FormFields {
    sender: "From",
    recipient: "To",
    body: "Body",
};

#[derive(Debug, Clone, Default)]
pub struct TwilioDriver {
    base_url: Option<String>,
}

impl TwilioDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send through a different API host, e.g. a local mock
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
        }
    }

    /// Open a connection with an explicit credential lookup
    pub fn open_with<F>(&self, options: &OpenOptions, lookup: F) -> crate::Result<TwilioConn>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = Credentials::resolve(&options.credentials, lookup)?;

        let mut api = TwilioApi::with_timeout(&credentials, options.send_timeout)?;
        if let Some(base_url) = &self.base_url {
            api = api.with_base_url(base_url.clone());
        }

        info!(
            account_sid = %credentials.account_sid,
            environment = ?options.environment,
            "Opened Twilio connection"
        );

        Ok(TwilioConn::new(
            api,
            credentials.phone_number,
            options.environment,
        ))
    }
}

impl SmsDriver for TwilioDriver {
    fn name(&self) -> &str {
        DRIVER_NAME
    }

    fn open(&self, options: &OpenOptions) -> sms_core::Result<Box<dyn SmsConn>> {
        let conn = self.open_with(options, |key| std::env::var(key).ok())?;
        Ok(Box::new(conn))
    }

    fn fields(&self) -> FormFields {
        FIELDS
    }

    fn webhook_routes(&self, ctx: WebhookContext) -> Router {
        webhook::router(ctx, self.fields())
    }
}

//! Open Twilio connection

use async_trait::async_trait;
use sms_core::{Environment, PhoneNumber, SmsConn};
use tracing::debug;

use crate::api::TwilioApi;
use crate::error::{Result, TwilioError};

/// Twilio's magic test number that always accepts outbound messages
pub const SANDBOX_FROM: &str = "+15005550006";

/// Connection returned by [`TwilioDriver::open`](crate::TwilioDriver)
#[derive(Debug, Clone)]
pub struct TwilioConn {
    api: TwilioApi,
    phone_number: Option<String>,
    environment: Environment,
}

impl TwilioConn {
    pub fn new(api: TwilioApi, phone_number: Option<String>, environment: Environment) -> Self {
        Self {
            api,
            phone_number,
            environment,
        }
    }

    /// Number used by [`SmsConn::send`]
    pub fn default_sender(&self) -> Result<&str> {
        if self.environment == Environment::Test {
            return Ok(SANDBOX_FROM);
        }
        self.phone_number
            .as_deref()
            .ok_or_else(|| TwilioError::Config("TWILIO_PHONE not set".to_string()))
    }

    async fn deliver(&self, from: &str, to: &str, body: &str) -> Result<()> {
        PhoneNumber::from(from).valid()?;
        PhoneNumber::from(to).valid()?;

        let sid = self.api.send_message(from, to, body).await?;
        debug!(sid = %sid, "SMS sent");
        Ok(())
    }
}

#[async_trait]
impl SmsConn for TwilioConn {
    async fn send_from(&self, from: &str, to: &str, body: &str) -> sms_core::Result<()> {
        Ok(self.deliver(from, to, body).await?)
    }

    async fn send(&self, to: &str, body: &str) -> sms_core::Result<()> {
        let from = self.default_sender()?;
        Ok(self.deliver(from, to, body).await?)
    }

    /// Twilio requests are made as needed, so there is nothing to close
    async fn close(&self) -> sms_core::Result<()> {
        Ok(())
    }
}

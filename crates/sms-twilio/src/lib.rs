//! sms-twilio: Twilio SMS driver for sms-gateway
//!
//! Registers under the `"twilio"` key. Outbound messages go through the
//! Twilio REST API; inbound messages arrive on `POST /twilio` and are
//! answered with TwiML.

pub mod api;
pub mod conn;
pub mod credentials;
pub mod driver;
pub mod error;
pub mod twiml;
pub mod webhook;

use std::sync::Arc;

use sms_core::DriverRegistry;

pub use api::TwilioApi;
pub use conn::TwilioConn;
pub use credentials::Credentials;
pub use driver::{TwilioDriver, DRIVER_NAME};
pub use error::{Result, TwilioError};
pub use twiml::TwimlResponse;

/// Register the Twilio driver with `registry`
pub fn register(registry: &mut DriverRegistry) -> sms_core::Result<()> {
    registry.register(Arc::new(TwilioDriver::new()))
}

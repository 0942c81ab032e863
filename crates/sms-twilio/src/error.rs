//! Error types for sms-twilio

use reqwest::StatusCode;
use sms_core::PhoneError;
use thiserror::Error;

/// sms-twilio error type
#[derive(Error, Debug)]
pub enum TwilioError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Twilio API error: {status} - {body}")]
    Api { status: StatusCode, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid phone number: {0}")]
    Phone(#[from] PhoneError),
}

impl From<TwilioError> for sms_core::Error {
    fn from(err: TwilioError) -> Self {
        match err {
            TwilioError::Config(msg) => sms_core::Error::Config(msg),
            TwilioError::Phone(e) => sms_core::Error::InvalidPhone(e),
            e @ (TwilioError::Api { .. } | TwilioError::Http(_)) => {
                sms_core::Error::Provider(e.to_string())
            }
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, TwilioError>;

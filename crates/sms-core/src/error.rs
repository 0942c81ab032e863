//! Error types for sms-core

use thiserror::Error;

use crate::phone::PhoneError;

/// Main error type for sms-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid phone number: {0}")]
    InvalidPhone(#[from] PhoneError),

    #[error("SMS provider error: {0}")]
    Provider(String),

    #[error("Failed to parse inbound request: {0}")]
    RequestParse(String),

    #[error("Text processing error: {0}")]
    Processing(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("SMS driver not found: {0}")]
    DriverNotFound(String),

    #[error("SMS driver already registered: {0}")]
    DriverAlreadyRegistered(String),
}

/// Result type alias for sms-core
pub type Result<T> = std::result::Result<T, Error>;

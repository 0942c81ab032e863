//! sms-core: SMS Gateway Core Library
//!
//! Host-side contract shared by every SMS driver: phone number validation,
//! the driver and connection traits, the driver registry, and the
//! text-processing collaborators an inbound webhook forwards to.

pub mod config;
pub mod driver;
pub mod error;
pub mod phone;
pub mod processor;
pub mod registry;

pub use config::{Config, Environment, ProcessorConfig, ReplyFormat, ServerConfig, SmsConfig};
pub use driver::{CredentialSource, FormFields, OpenOptions, SmsConn, SmsDriver, WebhookContext};
pub use error::{Error, Result};
pub use phone::{PhoneError, PhoneNumber};
pub use processor::{Exchange, FlexIdType, Notifier, ProcessOutcome, ProcessRequest, TextProcessor};
pub use registry::DriverRegistry;

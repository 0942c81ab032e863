//! SMS driver traits
//!
//! A driver is a pluggable provider adapter selected by name at runtime.
//! Opening a driver yields an [`SmsConn`] for the outbound path; the
//! driver's webhook routes cover the inbound path.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;

use crate::config::{Environment, ReplyFormat};
use crate::processor::{Notifier, TextProcessor};
use crate::Result;

/// Where a driver reads its provider credentials from
#[derive(Debug, Clone, Default)]
pub enum CredentialSource {
    /// Provider-specific environment variables
    #[default]
    Env,
    /// A colon-delimited connection string supplied by the caller
    ConnectionString(String),
}

/// Options passed to [`SmsDriver::open`]
#[derive(Debug, Clone, Default)]
pub struct OpenOptions {
    pub credentials: CredentialSource,
    pub environment: Environment,
    pub send_timeout: Option<Duration>,
}

impl OpenOptions {
    pub fn new(credentials: CredentialSource) -> Self {
        Self {
            credentials,
            ..Default::default()
        }
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn send_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.send_timeout = timeout;
        self
    }
}

/// Names of the inbound form fields carrying sender, recipient and body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormFields {
    pub sender: &'static str,
    pub recipient: &'static str,
    pub body: &'static str,
}

/// Collaborators handed to a driver's webhook routes
#[derive(Clone)]
pub struct WebhookContext {
    pub processor: Arc<dyn TextProcessor>,
    pub notifier: Option<Arc<dyn Notifier>>,
    pub reply_format: ReplyFormat,
}

impl WebhookContext {
    pub fn new(processor: Arc<dyn TextProcessor>) -> Self {
        Self {
            processor,
            notifier: None,
            reply_format: ReplyFormat::default(),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_reply_format(mut self, reply_format: ReplyFormat) -> Self {
        self.reply_format = reply_format;
        self
    }
}

/// An open provider connection
///
/// Implementations must tolerate concurrent `send` calls.
#[async_trait]
pub trait SmsConn: Send + Sync {
    /// Send `body` from an explicit sender number.
    ///
    /// Both numbers are validated before the provider is contacted.
    async fn send_from(&self, from: &str, to: &str, body: &str) -> Result<()>;

    /// Send `body` from the sender number resolved by the driver.
    async fn send(&self, to: &str, body: &str) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

/// A provider adapter registered in the [`DriverRegistry`](crate::DriverRegistry)
pub trait SmsDriver: Send + Sync {
    /// Registry key, also the URL prefix of the webhook routes
    fn name(&self) -> &str;

    /// Build a connection. Never performs network I/O.
    fn open(&self, options: &OpenOptions) -> Result<Box<dyn SmsConn>>;

    fn fields(&self) -> FormFields;

    /// Inbound webhook routes, relative to `/{name}`
    fn webhook_routes(&self, ctx: WebhookContext) -> Router;
}

//! Text-processing collaborators
//!
//! The host owns message understanding and persistence. Drivers reshape
//! inbound messages into a [`ProcessRequest`] and hand it to a
//! [`TextProcessor`]; a [`Notifier`] may then be told about the exchange.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Kind of identifier in [`ProcessRequest::flex_id`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum FlexIdType {
    Email = 1,
    Phone = 2,
}

impl From<FlexIdType> for u8 {
    fn from(t: FlexIdType) -> Self {
        t as u8
    }
}

impl TryFrom<u8> for FlexIdType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Self::Email),
            2 => Ok(Self::Phone),
            other => Err(Error::RequestParse(format!("Unknown FlexIDType: {}", other))),
        }
    }
}

/// Request understood by the host's text-processing entry point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRequest {
    #[serde(rename = "CMD")]
    pub cmd: String,
    #[serde(rename = "FlexID")]
    pub flex_id: String,
    #[serde(rename = "FlexIDType")]
    pub flex_id_type: FlexIdType,
}

impl ProcessRequest {
    /// Request for a message received over SMS
    pub fn sms(body: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            cmd: body.into(),
            flex_id: from.into(),
            flex_id_type: FlexIdType::Phone,
        }
    }
}

/// Reply produced by a [`TextProcessor`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessOutcome {
    pub reply: String,
    #[serde(default)]
    pub user_id: Option<u64>,
}

impl ProcessOutcome {
    pub fn reply(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            user_id: None,
        }
    }
}

/// One inbound message and the reply sent back for it
#[derive(Debug, Clone, Serialize)]
pub struct Exchange {
    pub request: ProcessRequest,
    pub reply: String,
    pub user_id: Option<u64>,
    pub received_at: DateTime<Utc>,
}

#[async_trait]
pub trait TextProcessor: Send + Sync {
    async fn process(&self, request: &ProcessRequest) -> Result<ProcessOutcome>;
}

/// Real-time notification of completed exchanges
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, exchange: &Exchange) -> Result<()>;
}

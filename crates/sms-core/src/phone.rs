//! Phone number validation
//!
//! Numbers are checked against an E.164 shape first, then against a
//! North-America-only policy: the leading `+` is mandatory and only the
//! `+1` country code is accepted for 12-character numbers.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9]\d{1,14}$").expect("phone regex is valid"));

/// Reason a phone number was rejected
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneError {
    #[error("invalid phone number format: must have E.164 formatting")]
    Format,

    #[error("unsupported international number")]
    UnsupportedRegion,

    #[error("first character in phone number must be +")]
    MissingPlus,
}

/// A phone number as supplied by a caller or an inbound webhook
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn new(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check the number against the provider's formatting expectations.
    ///
    /// Rules are applied in order and the first failing rule decides the
    /// error kind.
    pub fn valid(&self) -> Result<(), PhoneError> {
        let p = self.0.as_bytes();

        if p.len() < 10 || p.len() > 20 || !PHONE_RE.is_match(&self.0) {
            return Err(PhoneError::Format);
        }
        if p.len() == 11 && p[0] != b'1' {
            return Err(PhoneError::UnsupportedRegion);
        }
        if p[0] != b'+' {
            return Err(PhoneError::MissingPlus);
        }
        if p.len() == 12 && p[1] != b'1' {
            return Err(PhoneError::UnsupportedRegion);
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.valid().is_ok()
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PhoneNumber {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PhoneNumber {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

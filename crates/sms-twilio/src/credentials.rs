//! Twilio credential loading

use std::fmt;

use sms_core::CredentialSource;

use crate::error::{Result, TwilioError};

pub const ENV_ACCOUNT_SID: &str = "TWILIO_ACCOUNT_SID";
pub const ENV_AUTH_TOKEN: &str = "TWILIO_AUTH_TOKEN";
pub const ENV_PHONE: &str = "TWILIO_PHONE";

/// Account credentials and the optional default sending number
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub account_sid: String,
    pub auth_token: String,
    pub phone_number: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("phone_number", &self.phone_number)
            .finish()
    }
}

impl Credentials {
    pub fn new(account_sid: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            phone_number: None,
        }
    }

    pub fn with_phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }

    /// Read `TWILIO_ACCOUNT_SID`, `TWILIO_AUTH_TOKEN` and `TWILIO_PHONE`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let account_sid = var(ENV_ACCOUNT_SID)
            .ok_or_else(|| TwilioError::Config(format!("{} not set", ENV_ACCOUNT_SID)))?;
        let auth_token = var(ENV_AUTH_TOKEN)
            .ok_or_else(|| TwilioError::Config(format!("{} not set", ENV_AUTH_TOKEN)))?;

        Ok(Self {
            account_sid,
            auth_token,
            phone_number: var(ENV_PHONE),
        })
    }

    /// Parse `<account_sid>:<auth_token>[:<phone_number>]`
    pub fn parse(s: &str) -> Result<Self> {
        let mut parts = s.trim().splitn(3, ':');

        let account_sid = parts.next().unwrap_or_default();
        let auth_token = parts.next().ok_or_else(|| {
            TwilioError::Config(
                "Malformed connection string: expected <account_sid>:<auth_token>".to_string(),
            )
        })?;

        if account_sid.is_empty() || auth_token.is_empty() {
            return Err(TwilioError::Config(
                "Malformed connection string: account sid and auth token must not be empty"
                    .to_string(),
            ));
        }

        let phone_number = match parts.next() {
            Some("") => {
                return Err(TwilioError::Config(
                    "Malformed connection string: empty phone number".to_string(),
                ));
            }
            Some(phone) => Some(phone.to_string()),
            None => None,
        };

        Ok(Self {
            account_sid: account_sid.to_string(),
            auth_token: auth_token.to_string(),
            phone_number,
        })
    }

    /// Resolve credentials from `source`.
    ///
    /// A connection string without a phone number falls back to
    /// `TWILIO_PHONE`.
    pub fn resolve<F>(source: &CredentialSource, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        match source {
            CredentialSource::Env => Self::from_lookup(lookup),
            CredentialSource::ConnectionString(s) => {
                let mut creds = Self::parse(s)?;
                if creds.phone_number.is_none() {
                    creds.phone_number = lookup(ENV_PHONE).filter(|v| !v.trim().is_empty());
                }
                Ok(creds)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_parse_connection_string() {
        let creds = Credentials::parse("AC123:token123").unwrap();
        assert_eq!(creds.account_sid, "AC123");
        assert_eq!(creds.auth_token, "token123");
        assert!(creds.phone_number.is_none());

        let creds = Credentials::parse("AC123:token123:+15005550006").unwrap();
        assert_eq!(creds.phone_number.as_deref(), Some("+15005550006"));
    }

    #[test]
    fn test_parse_malformed_connection_string() {
        for s in ["AC123token123", "", ":token123", "AC123:", "AC123:token123:"] {
            let result = Credentials::parse(s);
            assert!(matches!(result, Err(TwilioError::Config(_))), "{s:?}");
        }
    }

    #[test]
    fn test_from_lookup() {
        let creds = Credentials::from_lookup(env(&[
            ("TWILIO_ACCOUNT_SID", "AC123"),
            ("TWILIO_AUTH_TOKEN", "token123"),
            ("TWILIO_PHONE", "+13105555555"),
        ]))
        .unwrap();
        assert_eq!(
            creds,
            Credentials::new("AC123", "token123").with_phone_number("+13105555555")
        );
    }

    #[test]
    fn test_from_lookup_missing_token() {
        let result = Credentials::from_lookup(env(&[("TWILIO_ACCOUNT_SID", "AC123")]));
        assert!(matches!(result, Err(TwilioError::Config(msg)) if msg.contains("TWILIO_AUTH_TOKEN")));

        let result = Credentials::from_lookup(env(&[
            ("TWILIO_ACCOUNT_SID", ""),
            ("TWILIO_AUTH_TOKEN", "token123"),
        ]));
        assert!(matches!(result, Err(TwilioError::Config(_))));
    }

    #[test]
    fn test_resolve_connection_string_phone_fallback() {
        let source = CredentialSource::ConnectionString("AC123:token123".to_string());
        let creds =
            Credentials::resolve(&source, env(&[("TWILIO_PHONE", "+13105555555")])).unwrap();
        assert_eq!(creds.phone_number.as_deref(), Some("+13105555555"));

        let source = CredentialSource::ConnectionString("AC123:token123:+14155551234".to_string());
        let creds =
            Credentials::resolve(&source, env(&[("TWILIO_PHONE", "+13105555555")])).unwrap();
        assert_eq!(creds.phone_number.as_deref(), Some("+14155551234"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let creds = Credentials::new("AC123", "supersecret");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("AC123"));
        assert!(!debug.contains("supersecret"));
    }
}

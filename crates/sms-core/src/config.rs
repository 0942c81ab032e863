//! Configuration management
//!
//! Configuration is resolved in the following priority order:
//! 1. Environment variables
//! 2. `sms-gateway.toml` configuration file
//! 3. Default values
//!
//! `${VAR_NAME}` inside the configuration file is expanded from the
//! environment before parsing.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Runtime environment of the gateway
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Development,
    /// Outbound messages are sent from the provider's sandbox number
    Test,
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" | "" => Ok(Self::Production),
            "development" | "dev" => Ok(Self::Development),
            "test" => Ok(Self::Test),
            other => Err(Error::Config(format!("Unknown environment: {}", other))),
        }
    }
}

/// How the inbound webhook writes its reply
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReplyFormat {
    /// Raw reply text as `text/plain`
    Text,
    /// `<Response><Message>…</Message></Response>` as `application/xml`
    #[default]
    Twiml,
}

impl FromStr for ReplyFormat {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "twiml" | "xml" => Ok(Self::Twiml),
            other => Err(Error::Config(format!("Unknown reply format: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port for the webhook HTTP server
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsConfig {
    /// Registry key of the driver to open
    #[serde(default = "default_driver")]
    pub driver: String,

    /// Inbound reply rendering
    #[serde(default)]
    pub reply_format: ReplyFormat,

    /// Upper bound on a single provider call. None blocks until the
    /// provider answers.
    #[serde(default)]
    pub send_timeout_secs: Option<u64>,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            driver: default_driver(),
            reply_format: ReplyFormat::default(),
            send_timeout_secs: None,
        }
    }
}

impl SmsConfig {
    pub fn send_timeout(&self) -> Option<Duration> {
        self.send_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Endpoint of the host's text-processing service
    pub url: Option<String>,

    /// Endpoint notified after every exchange (dashboards etc.)
    pub notify_url: Option<String>,
}

/// Main configuration for sms-gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub environment: Environment,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub sms: SmsConfig,

    #[serde(default)]
    pub processor: ProcessorConfig,
}

fn default_port() -> u16 {
    4200
}

fn default_driver() -> String {
    "twilio".to_string()
}

impl Config {
    /// Expand `${VAR_NAME}` references using `lookup`.
    ///
    /// Unknown variables expand to an empty string.
    fn expand_env_vars(value: &str, lookup: &impl Fn(&str) -> Option<String>) -> String {
        let mut result = String::with_capacity(value.len());
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next();

                let mut var_name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Some(env_value) = lookup(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        Self::from_toml_file_with(path, |key| std::env::var(key).ok())
    }

    pub fn from_toml_file_with<P, F>(path: P, lookup: F) -> crate::Result<Self>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let expanded = Self::expand_env_vars(&content, &lookup);

        let mut cfg: Config = toml::from_str(&expanded)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        cfg.apply_env_overrides(&lookup)?;
        Ok(cfg)
    }

    /// Load configuration from the default path or the environment.
    ///
    /// Looks for `./sms-gateway.toml` and falls back to environment
    /// variables only.
    pub fn load() -> crate::Result<Self> {
        if Path::new("sms-gateway.toml").exists() {
            return Self::from_toml_file("sms-gateway.toml");
        }
        Self::from_env()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> crate::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Config::default();
        cfg.apply_env_overrides(&lookup)?;
        Ok(cfg)
    }

    fn apply_env_overrides<F>(&mut self, lookup: &F) -> crate::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(env) = var("SMS_GATEWAY_ENV") {
            self.environment = env.parse()?;
        }

        if let Some(port) = var("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("Invalid PORT: {}", port)))?;
        }

        if let Some(driver) = var("SMS_DRIVER") {
            self.sms.driver = driver.trim().to_string();
        }
        if let Some(format) = var("SMS_REPLY_FORMAT") {
            self.sms.reply_format = format.parse()?;
        }
        if let Some(secs) = var("SMS_SEND_TIMEOUT_SECS") {
            let secs = secs
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("Invalid SMS_SEND_TIMEOUT_SECS: {}", secs)))?;
            self.sms.send_timeout_secs = Some(secs);
        }

        if let Some(url) = var("PROCESS_TEXT_URL") {
            self.processor.url = Some(url);
        }
        if let Some(url) = var("NOTIFY_URL") {
            self.processor.notify_url = Some(url);
        }

        // an unset `${VAR}` in the file expands to ""
        self.processor.url = self.processor.url.take().filter(|u| !u.trim().is_empty());
        self.processor.notify_url = self
            .processor
            .notify_url
            .take()
            .filter(|u| !u.trim().is_empty());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.server.port, 4200);
        assert_eq!(config.sms.driver, "twilio");
        assert_eq!(config.sms.reply_format, ReplyFormat::Twiml);
        assert!(config.sms.send_timeout().is_none());
        assert!(config.processor.url.is_none());
    }

    #[test]
    fn test_from_lookup() {
        let config = Config::from_lookup(lookup_from(&[
            ("SMS_GATEWAY_ENV", "test"),
            ("PORT", "8080"),
            ("SMS_REPLY_FORMAT", "text"),
            ("SMS_SEND_TIMEOUT_SECS", "15"),
            ("PROCESS_TEXT_URL", "http://localhost:4300/process"),
        ]))
        .unwrap();

        assert_eq!(config.environment, Environment::Test);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.sms.reply_format, ReplyFormat::Text);
        assert_eq!(config.sms.send_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(
            config.processor.url.as_deref(),
            Some("http://localhost:4300/process")
        );
        assert!(config.processor.notify_url.is_none());
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let config = Config::from_lookup(lookup_from(&[("PORT", ""), ("SMS_DRIVER", "  ")])).unwrap();
        assert_eq!(config.server.port, 4200);
        assert_eq!(config.sms.driver, "twilio");
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let result = Config::from_lookup(lookup_from(&[("PORT", "not-a-port")]));
        assert!(matches!(result, Err(Error::Config(_))));

        let result = Config::from_lookup(lookup_from(&[("SMS_REPLY_FORMAT", "json")]));
        assert!(matches!(result, Err(Error::Config(_))));

        let result = Config::from_lookup(lookup_from(&[("SMS_GATEWAY_ENV", "staging")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_expand_env_vars() {
        let lookup = lookup_from(&[("SMS_TEST_VAR", "test_value")]);

        let result = Config::expand_env_vars("prefix_${SMS_TEST_VAR}_suffix", &lookup);
        assert_eq!(result, "prefix_test_value_suffix");

        let result = Config::expand_env_vars("prefix_${NONEXISTENT_VAR}_suffix", &lookup);
        assert_eq!(result, "prefix__suffix");

        let result = Config::expand_env_vars("no_vars_here", &lookup);
        assert_eq!(result, "no_vars_here");
    }

    #[test]
    fn test_from_toml_file_with_env_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
environment = "development"

[server]
port = 9000

[sms]
reply_format = "text"

[processor]
url = "${{PROCESSOR_HOST}}/process"
"#
        )
        .unwrap();

        let lookup = lookup_from(&[("PROCESSOR_HOST", "http://nlp:4300"), ("PORT", "9100")]);
        let config = Config::from_toml_file_with(file.path(), lookup).unwrap();

        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.sms.driver, "twilio");
        assert_eq!(config.sms.reply_format, ReplyFormat::Text);
        assert_eq!(config.processor.url.as_deref(), Some("http://nlp:4300/process"));
    }

    #[test]
    fn test_unset_placeholder_urls_are_treated_as_absent() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[processor]
url = "${{PROCESS_TEXT_URL}}"
notify_url = "  "
"#
        )
        .unwrap();

        let config = Config::from_toml_file_with(file.path(), |_| None).unwrap();

        assert!(config.processor.url.is_none());
        assert!(config.processor.notify_url.is_none());
    }

    #[test]
    fn test_from_toml_file_missing() {
        let result = Config::from_toml_file_with("/nonexistent/sms-gateway.toml", |_| None);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}

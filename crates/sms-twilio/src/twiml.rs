//! TwiML reply envelope

use serde::{Deserialize, Serialize};

use crate::error::{Result, TwilioError};

/// `<Response><Message>…</Message></Response>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "Response")]
pub struct TwimlResponse {
    #[serde(rename = "Message", default)]
    pub message: String,
}

impl TwimlResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Serialize `message` as a TwiML reply
pub fn render(message: &str) -> Result<String> {
    quick_xml::se::to_string(&TwimlResponse::new(message))
        .map_err(|e| TwilioError::Config(format!("Failed to render TwiML: {}", e)))
}

/// Parse a TwiML reply back into its message
pub fn parse(xml: &str) -> Result<TwimlResponse> {
    quick_xml::de::from_str(xml)
        .map_err(|e| TwilioError::Config(format!("Failed to parse TwiML: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let xml = render("Hello there").unwrap();
        assert_eq!(xml, "<Response><Message>Hello there</Message></Response>");
    }

    #[test]
    fn test_render_escapes_markup() {
        let xml = render("1 < 2 & <b>bold</b>").unwrap();
        assert!(!xml.contains("<b>"));
        assert!(xml.contains("&lt;"));
        assert!(xml.contains("&amp;"));

        assert_eq!(parse(&xml).unwrap().message, "1 < 2 & <b>bold</b>");
    }

    #[test]
    fn test_round_trip() {
        for msg in [
            "hello",
            "Something went wrong with my wiring... I'll get that fixed up soon.",
            "multi\nline",
        ] {
            let xml = render(msg).unwrap();
            assert_eq!(parse(&xml).unwrap(), TwimlResponse::new(msg));
        }
    }

    #[test]
    fn test_empty_message_is_empty_envelope() {
        let xml = render("").unwrap();
        assert!(xml.starts_with("<Response>"));
        assert!(xml.ends_with("</Response>"));
    }

    #[test]
    fn test_parse_without_message() {
        let resp = parse("<Response></Response>").unwrap();
        assert!(resp.message.is_empty());
    }
}

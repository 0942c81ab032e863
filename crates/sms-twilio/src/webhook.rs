//! Webhook handler for inbound SMS from Twilio
//!
//! Unlike other handlers, internal errors are absorbed here instead of being
//! returned: the end user only ever sees a humanized apology over SMS and
//! Twilio always gets a 200.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use chrono::Utc;
use sms_core::{Error, Exchange, FormFields, ProcessRequest, ReplyFormat, WebhookContext};
use tracing::{debug, error, info_span, warn, Instrument};
use uuid::Uuid;

use crate::twiml;

/// Reply sent whenever anything goes wrong while handling a message
pub const APOLOGY: &str = "Something went wrong with my wiring... I'll get that fixed up soon.";

const FALLBACK_TWIML: &str = "<Response><Message>Something went wrong with my wiring... I'll get that fixed up soon.</Message></Response>";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Fields of Twilio's inbound message callback used by the gateway
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundMessage {
    pub body: String,
    pub from: String,
    pub to: String,
}

/// Result of reading an inbound callback.
///
/// `error` is set when the request could not be read cleanly; `message`
/// still carries every field that was recovered.
#[derive(Debug, Default)]
pub struct ParsedForm {
    pub message: InboundMessage,
    pub error: Option<Error>,
}

struct WebhookState {
    ctx: WebhookContext,
    fields: FormFields,
}

/// Routes relative to the driver prefix: `POST /` becomes `POST /twilio`
pub fn router(ctx: WebhookContext, fields: FormFields) -> Router {
    Router::new()
        .route("/", post(handle_sms))
        .with_state(Arc::new(WebhookState { ctx, fields }))
}

async fn handle_sms(
    State(state): State<Arc<WebhookState>>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let span = info_span!("twilio_webhook", request_id = %Uuid::new_v4());

    async move {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());
        let body = body.map_err(|e| Error::RequestParse(e.body_text()));

        let parsed = parse_form(state.fields, content_type, body, query.as_deref());
        let reply = respond(&state.ctx, parsed).await;
        render_reply(state.ctx.reply_format, &reply)
    }
    .instrument(span)
    .await
}

fn is_form(content_type: Option<&str>) -> bool {
    content_type.is_none_or(|ct| {
        ct.split(';')
            .next()
            .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
    })
}

fn decode_pairs(raw: &[u8]) -> Result<Vec<(String, String)>, Error> {
    serde_urlencoded::from_bytes(raw).map_err(|e| Error::RequestParse(e.to_string()))
}

/// Collect the callback fields from the form body and the query string.
///
/// Body values win over query values and the first occurrence of a repeated
/// key is used. Bodies of other content types are ignored. A body that cannot
/// be read or is not valid UTF-8 sets the error, but fields are still
/// recovered from what was received.
pub fn parse_form(
    fields: FormFields,
    content_type: Option<&str>,
    body: sms_core::Result<Bytes>,
    query: Option<&str>,
) -> ParsedForm {
    let mut error = None;
    let mut pairs = Vec::new();

    match body {
        Ok(bytes) if is_form(content_type) => {
            if let Err(e) = std::str::from_utf8(&bytes) {
                error = Some(Error::RequestParse(format!("Form body is not UTF-8: {}", e)));
            }
            match decode_pairs(&bytes) {
                Ok(body_pairs) => pairs = body_pairs,
                Err(e) => {
                    error.get_or_insert(e);
                }
            }
        }
        Ok(_) => debug!(content_type = ?content_type, "Ignoring non-form request body"),
        Err(e) => error = Some(e),
    }

    if let Some(query) = query {
        match decode_pairs(query.as_bytes()) {
            Ok(query_pairs) => pairs.extend(query_pairs),
            Err(e) => {
                error.get_or_insert(e);
            }
        }
    }

    let value = |name: &str| {
        pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, v)| v.clone())
            .unwrap_or_default()
    };

    ParsedForm {
        message: InboundMessage {
            body: value(fields.body),
            from: value(fields.sender),
            to: value(fields.recipient),
        },
        error,
    }
}

/// Produce the reply text for one inbound message.
///
/// Every failure is logged and turns the reply into [`APOLOGY`]; processing
/// continues with whatever was recovered.
pub async fn respond(ctx: &WebhookContext, parsed: ParsedForm) -> String {
    let received_at = Utc::now();
    let mut failed = false;

    let msg = parsed.message;
    if let Some(e) = parsed.error {
        warn!(error = %e, "Failed parsing Twilio post form");
        failed = true;
    }
    debug!(from = %msg.from, to = %msg.to, "Received SMS");

    let request = ProcessRequest::sms(msg.body, msg.from);

    let (mut reply, user_id) = match ctx.processor.process(&request).await {
        Ok(outcome) => (outcome.reply, outcome.user_id),
        Err(e) => {
            error!(error = %e, "Failed processing text");
            failed = true;
            (String::new(), None)
        }
    };
    if failed {
        reply = APOLOGY.to_string();
    }

    if let Some(notifier) = &ctx.notifier {
        let exchange = Exchange {
            request,
            reply: reply.clone(),
            user_id,
            received_at,
        };
        if let Err(e) = notifier.notify(&exchange).await {
            warn!(error = %e, "Failed notifying exchange");
            if !failed {
                reply = APOLOGY.to_string();
            }
        }
    }

    reply
}

fn render_reply(format: ReplyFormat, reply: &str) -> Response {
    debug!(?format, len = reply.len(), "Sending reply");
    match format {
        ReplyFormat::Text => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            reply.to_string(),
        )
            .into_response(),
        ReplyFormat::Twiml => {
            let xml = twiml::render(reply).unwrap_or_else(|e| {
                error!(error = %e, "Failed rendering TwiML reply");
                FALLBACK_TWIML.to_string()
            });
            (StatusCode::OK, [(header::CONTENT_TYPE, "application/xml")], xml).into_response()
        }
    }
}

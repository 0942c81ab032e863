//! Webhook HTTP server
//!
//! Mounts every registered driver's webhook routes under its name.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use sms_core::{Config, DriverRegistry, WebhookContext};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::collaborators::{HttpNotifier, HttpTextProcessor};

/// Build the webhook collaborators from configuration
pub fn webhook_context(config: &Config) -> anyhow::Result<WebhookContext> {
    let url = config
        .processor
        .url
        .as_deref()
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("PROCESS_TEXT_URL not set"))?;

    let mut ctx = WebhookContext::new(Arc::new(HttpTextProcessor::new(url)))
        .with_reply_format(config.sms.reply_format);

    let notify_url = config
        .processor
        .notify_url
        .as_deref()
        .filter(|u| !u.trim().is_empty());
    if let Some(notify_url) = notify_url {
        ctx = ctx.with_notifier(Arc::new(HttpNotifier::new(notify_url)));
    } else {
        info!("Exchange notifications disabled (no NOTIFY_URL configured)");
    }

    Ok(ctx)
}

/// Health check endpoint
async fn health() -> &'static str {
    "OK"
}

/// Create the gateway router
pub fn routes(registry: &DriverRegistry, ctx: WebhookContext) -> Router {
    registry
        .webhook_router(ctx)
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
}

/// Serve `app` until Ctrl+C
pub async fn start_server(port: u16, app: Router) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Webhook server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down...");
        })
        .await?;

    Ok(())
}

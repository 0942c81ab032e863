//! sms-gateway: SMS Gateway Main Binary
//!
//! Usage:
//!   sms-gateway                     - Serve inbound SMS webhooks
//!   sms-gateway --send <to> <msg>   - Send one SMS and exit
//!   sms-gateway --help              - Show help

mod collaborators;
mod server;

use sms_core::{Config, CredentialSource, DriverRegistry, OpenOptions};
use tracing_subscriber::EnvFilter;

/// Run mode
#[derive(Debug, PartialEq, Eq)]
enum RunMode {
    /// Webhook server mode
    Serve,
    /// Send a single message
    Send { to: String, message: String },
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mode = parse_args(std::env::args().skip(1))?;

    match mode {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("sms-gateway {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    let mut registry = DriverRegistry::new();
    sms_twilio::register(&mut registry)?;
    tracing::info!("Registered SMS drivers: {:?}", registry.names());

    match mode {
        RunMode::Send { to, message } => {
            send_once(&registry, &config, &to, &message).await?;
            tracing::info!("Message sent to {}", to);
        }
        RunMode::Serve => {
            let app = serve_app(&registry, &config)?;

            tracing::info!("Starting sms-gateway ({:?})", config.environment);
            server::start_server(config.server.port, app).await?;
        }
        _ => {}
    }

    Ok(())
}

/// Open the configured driver, send one message and close the connection
async fn send_once(
    registry: &DriverRegistry,
    config: &Config,
    to: &str,
    message: &str,
) -> anyhow::Result<()> {
    let options = OpenOptions::new(CredentialSource::Env)
        .environment(config.environment)
        .send_timeout(config.sms.send_timeout());
    let conn = registry
        .open(&config.sms.driver, &options)
        .map_err(|e| anyhow::anyhow!("Failed to open SMS driver {}: {}", config.sms.driver, e))?;

    let sent = conn.send(to, message).await;
    conn.close().await?;
    Ok(sent?)
}

/// Webhook server router. No driver connection is opened for serving.
fn serve_app(registry: &DriverRegistry, config: &Config) -> anyhow::Result<axum::Router> {
    let ctx = server::webhook_context(config)?;
    Ok(server::routes(registry, ctx))
}

/// Parse command line arguments
fn parse_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<RunMode> {
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(RunMode::Help),
            "--version" | "-v" => return Ok(RunMode::Version),
            "--send" | "-s" => {
                let (Some(to), Some(message)) = (args.next(), args.next()) else {
                    anyhow::bail!("--send requires <to> and <message>");
                };
                return Ok(RunMode::Send { to, message });
            }
            _ => {}
        }
    }

    Ok(RunMode::Serve)
}

/// Print help message
fn print_help() {
    println!("sms-gateway - SMS chatbot gateway");
    println!();
    println!("Usage:");
    println!("  sms-gateway                    Serve inbound SMS webhooks (POST /twilio)");
    println!("  sms-gateway --send <to> <msg>  Send one SMS and exit");
    println!("  sms-gateway --help             Show this help message");
    println!("  sms-gateway --version          Show version");
    println!();
    println!("Environment Variables:");
    println!("  TWILIO_ACCOUNT_SID     Twilio account SID (required to send)");
    println!("  TWILIO_AUTH_TOKEN      Twilio auth token (required to send)");
    println!("  TWILIO_PHONE           Sending phone number, e.g. +13105555555");
    println!("  SMS_GATEWAY_ENV        production, development or test (test sends from the sandbox number)");
    println!("  PORT                   Webhook server port (default: 4200)");
    println!("  SMS_DRIVER             SMS driver name (default: twilio)");
    println!("  SMS_REPLY_FORMAT       twiml or text (default: twiml)");
    println!("  SMS_SEND_TIMEOUT_SECS  Timeout for provider calls (default: none)");
    println!("  PROCESS_TEXT_URL       Text processing endpoint (required to serve)");
    println!("  NOTIFY_URL             Exchange notification endpoint (optional)");
}

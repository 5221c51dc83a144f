//! Webhook mode implementation for the bot.
//!
//! Uses teloxide's axum webhook support to:
//! - Call `setWebhook` on Telegram
//! - Receive updates on the webhook path
//! - Serve `/` and `/health` for the hosting platform's probes
//!
//! Ctrl+C stops the dispatcher, which in turn stops the HTTP server.

use std::net::SocketAddr;

use anyhow::Context;
use axum::Router;
use axum::routing::get;
use serde_json::{Value, json};
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks::{self, Options};
use tracing::{error, info};
use url::Url;

use super::dispatcher::ThrottledBot;
use crate::config::Config;

async fn home() -> &'static str {
    "Bot is running"
}

async fn health() -> axum::Json<Value> {
    axum::Json(json!({ "status": "healthy" }))
}

/// Liveness routes, served next to the webhook.
pub fn probe_routes() -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
}

/// Start the bot in webhook mode.
pub async fn start_webhook(
    config: &Config,
    mut dispatcher: Dispatcher<ThrottledBot, anyhow::Error, teloxide::dispatching::DefaultKey>,
    bot: ThrottledBot,
) -> anyhow::Result<()> {
    let webhook_url = config
        .webhook_url
        .as_ref()
        .context("WEBHOOK_URL must be set when using webhook mode")?;
    let url = Url::parse(webhook_url).context("Invalid WEBHOOK_URL format")?;

    // Listen on all interfaces at the configured port
    let address = SocketAddr::from(([0, 0, 0, 0], config.webhook_port));

    let mut options = Options::new(address, url.clone());
    if let Some(ref secret) = config.webhook_secret {
        options = options.secret_token(secret.clone());
        info!("Webhook secret token configured");
    }

    info!("🔗 Setting webhook URL: {}", url);

    // setWebhook only needs basic API access, no throttling
    let (listener, stop_flag, router) = webhooks::axum_to_router(bot.inner().clone(), options)
        .await
        .context("Failed to setup webhook")?;
    let app = router.merge(probe_routes());

    let tcp = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("Couldn't bind to {}", address))?;
    info!("📡 Listening on: {}", address);

    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(tcp, app).with_graceful_shutdown(stop_flag).await {
            error!("HTTP server error: {}", e);
        }
    });

    info!("✅ Webhook setup complete, waiting for updates...");

    let error_handler = LoggingErrorHandler::with_custom_text("Error from update listener");
    dispatcher
        .dispatch_with_listener(listener, error_handler)
        .await;

    server.await.context("HTTP server task panicked")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_body() {
        let axum::Json(body) = health().await;
        assert_eq!(body, json!({ "status": "healthy" }));
        assert_eq!(home().await, "Bot is running");
    }
}

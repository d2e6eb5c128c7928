//! fal-webhook server - verifying receiver for fal.ai webhooks.
//!
//! Deliveries arrive on `POST /webhooks/fal` and are checked against fal.ai's
//! published Ed25519 key set before the payload is logged. The key set is
//! kept in an in-process cache unless `FAL_JWKS_CACHE_ENABLED=false`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fal_webhook::web::{fal_webhook, health};
use fal_webhook::{AppState, Config, KeyCache, MemoryKeyCache, WebhookVerifier};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::from_env();
    info!(
        port = config.port,
        jwks_url = %config.jwks_url,
        jwks_cache_enabled = config.jwks_cache_enabled,
        jwks_cache_key = %config.jwks_cache_key,
        jwks_cache_ttl_secs = config.jwks_cache_ttl_secs,
        "fal_webhook_server_starting"
    );

    let verifier = WebhookVerifier::new(key_cache(&config), config.verifier_settings())
        .context("Failed to create webhook verifier")?;

    let app = Router::new()
        .route("/health", get(health))
        .route("/webhooks/fal", post(fal_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(verifier));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind webhook listener on {}", addr))?;

    info!(address = %addr, webhook_path = "/webhooks/fal", "fal_webhook_server_listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Webhook server error")?;

    info!("fal_webhook_server_stopped");

    Ok(())
}

/// JSON logs, filtered by `RUST_LOG` (default `info`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();
}

/// The shared key-set cache, or `None` when caching is switched off.
fn key_cache(config: &Config) -> Option<Arc<dyn KeyCache>> {
    config
        .jwks_cache_enabled
        .then(|| Arc::new(MemoryKeyCache::new()) as Arc<dyn KeyCache>)
}

/// Resolves on SIGINT or SIGTERM so in-flight verifications can finish.
///
/// A handler that cannot be installed is logged and never fires.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "sigint_handler_unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "sigterm_handler_unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let received = tokio::select! {
        _ = interrupt => "SIGINT",
        _ = terminate => "SIGTERM",
    };

    info!(signal = received, "fal_webhook_server_draining");
}

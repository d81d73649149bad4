//! Paid cache admin server
//!
//! Hosts a shared cache, sweeps it in the background, reads billing data
//! through it and exposes the admin endpoints for inspection and
//! invalidation.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paid_cache::api::{create_router, AppState};
use paid_cache::{spawn_cleanup_task, Config};

/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the shared cache and the Paid client that reads through it
/// 4. Start background TTL cleanup task
/// 5. Serve the admin and read-through routes until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paid_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Paid cache server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: default_ttl={}s, port={}, cleanup_interval={}s",
        config.default_ttl, config.server_port, config.cleanup_interval
    );

    let state = AppState::from_config(&config).context("failed to build Paid HTTP client")?;
    match state.client.options().custom_base() {
        Some(base) => info!(base_url = %base, "Paid client targets custom backend"),
        None => info!(origin = %state.client.options().proxy_base(), "Paid client targets proxy"),
    }

    let cleanup_handle =
        spawn_cleanup_task(state.cache.clone(), Duration::from_secs(config.cleanup_interval));
    info!("Background cleanup task started");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for Ctrl+C or SIGTERM, then stops the cleanup task.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    cleanup_handle.abort();
    warn!("Cleanup task aborted");
}

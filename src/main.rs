//! OG Newsletter server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use og_newsletter::clock::SystemClock;
use og_newsletter::{create_router, spawn_refresh_task, AppState, Config};

/// Main entry point for the newsletter server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration; refuse to start without a usable cookie secret
/// 3. Build the platform client, article cache and cookie manager
/// 4. Start the background article refresh task
/// 5. Serve HTTP until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "og_newsletter=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting OG Newsletter server");

    let config = Config::from_env().context("invalid configuration")?;
    info!(
        "Configuration loaded: platform_configured={}, port={}, cache_ttl={}s, refresh_interval={}s",
        config.platform.is_some(),
        config.server_port,
        config.cache_ttl,
        config.refresh_interval
    );

    let state = AppState::from_config(&config, Arc::new(SystemClock))
        .context("failed to build application state")?;

    let refresh_handle = match (&state.articles, config.refresh_interval) {
        (Some(cache), interval) if interval > 0 => {
            info!("Background article refresh task started");
            Some(spawn_refresh_task(cache.clone(), interval))
        }
        _ => None,
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(refresh_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the refresh task.
async fn shutdown_signal(refresh_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", err);
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
                warn!("Failed to install SIGTERM handler: {}", err);
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

    if let Some(handle) = refresh_handle {
        handle.abort();
        warn!("Article refresh task aborted");
    }
}

//! Tiered Cache - cache service binary
//!
//! Serves the two-tier cache over HTTP.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tiered_cache::api::{create_router, AppState};
use tiered_cache::cache::MemoryPressure;
use tiered_cache::{spawn_clean_task, Config};

/// Main entry point for the cache service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the memory and disk tiers
/// 4. Subscribe the memory tier to low-memory events
/// 5. Start the background clean task
/// 6. Serve HTTP until SIGINT/SIGTERM, then flush pending disk writes
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tiered_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tiered cache service");

    let config = Config::from_env();
    info!(
        "Configuration loaded: memory_capacity={}, disk_ttl={}s, cache_dir={}, port={}, clean_interval={}s",
        config.memory_capacity,
        config.disk_ttl,
        config.cache_dir.display(),
        config.server_port,
        config.clean_interval
    );

    let state = AppState::from_config(&config);

    let pressure = MemoryPressure::new();
    let _pressure_subscription = state.cache.memory().purge_on_pressure(&pressure);
    spawn_pressure_listener(pressure);

    let clean_handle = spawn_clean_task(state.cache.clone(), config.clean_interval);
    info!("Background clean task started");

    let disk = state.cache.disk().clone();
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    clean_handle.abort();
    warn!("Clean task aborted");

    info!(pending = disk.pending(), "Flushing pending disk operations");
    disk.flush().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Forwards SIGUSR1 to `pressure` as a low-memory event.
#[cfg(unix)]
fn spawn_pressure_listener(pressure: MemoryPressure) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut usr1 = match signal(SignalKind::user_defined1()) {
        Ok(stream) => stream,
        Err(e) => {
            warn!(error = %e, "Could not install SIGUSR1 handler, low memory signal disabled");
            return;
        }
    };
    tokio::spawn(async move {
        while usr1.recv().await.is_some() {
            info!("Received SIGUSR1, signalling low memory");
            pressure.notify();
        }
    });
}

#[cfg(not(unix))]
fn spawn_pressure_listener(_pressure: MemoryPressure) {}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
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
}

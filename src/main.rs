use std::net::SocketAddr;
use std::process::ExitCode;

use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use admission_gate::{AppState, Config, build_router, metrics, utils};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting Admission Gate v{}", env!("CARGO_PKG_VERSION"));

    match run().await {
        Ok(()) => ExitCode::from(exitcode::OK as u8),
        Err(exit_code) => ExitCode::from(exit_code as u8),
    }
}

/// Run the application, returning an exit code on error.
async fn run() -> Result<(), exitcode::ExitCode> {
    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Configuration error: {e}");
        exitcode::CONFIG
    })?;
    info!(
        host = %config.host,
        port = %config.port,
        server_name = %config.gate.server_name,
        server_version = %config.gate.server_version,
        "Configuration loaded"
    );

    if config.gate.xsrf_disabled {
        warn!("XSRF protection is disabled (XSRF_DISABLE_PROTECTION=true)");
    }

    if let Some(metrics_addr) = config.metrics_addr() {
        metrics::try_init_metrics(metrics_addr);
    } else {
        info!("Prometheus metrics disabled (METRICS_PORT=0)");
    }

    // Build application state and router
    let state = AppState::new(config.clone());
    let app = build_router(state).map_err(|e| {
        error!("Failed to build router: {e}");
        exitcode::CONFIG
    })?;

    // Start server
    let addr: SocketAddr = config.server_addr().parse().map_err(|e| {
        error!("Invalid server address: {e}");
        exitcode::CONFIG
    })?;
    let listener = TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind to {addr}: {e}");
        exitcode::UNAVAILABLE
    })?;

    info!("Server listening on http://{addr}");
    info!("API endpoints:");
    info!("  GET  /health         - Health check (no XSRF required)");
    info!("  GET  /api/status     - Server name, version, gate settings");
    info!("  POST /api/echo       - Echo JSON body (public)");
    info!("  POST /internal/echo  - Echo JSON body (internal)");

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let signal = utils::shutdown_signal().await;
            warn!(signal, "Shutdown signal received, draining connections...");
        })
        .await
        .map_err(|e| {
            error!("Server error: {e}");
            exitcode::SOFTWARE
        })?;

    info!("Server shutdown complete");
    Ok(())
}

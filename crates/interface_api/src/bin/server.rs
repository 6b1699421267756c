//! Claim Evaluator - API Server Binary
//!
//! This binary starts the HTTP API server for claim evaluation.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin claims-api
//!
//! # Run with environment variables
//! API_HOST=0.0.0.0 API_PORT=8080 API_MAX_PASSES=5 cargo run --bin claims-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_MAX_PASSES` - Inference pass cap per claim (default: 5)
//! * `API_CURRENCY` - Currency code of submitted amounts (default: INR)

use std::net::SocketAddr;

use anyhow::Context;
use interface_api::{config::ApiConfig, create_router};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Main entry point for the API server.
///
/// Initializes logging, loads configuration and starts the HTTP server.
///
/// # Errors
///
/// Returns an error if:
/// - The configured address is invalid
/// - Server fails to bind to the configured address
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = load_config();

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        max_passes = config.max_passes,
        currency = %config.currency,
        "Starting Claim Evaluator API Server"
    );

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid server address {}", config.server_addr()))?;

    let app = create_router(config);

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Loads API configuration, falling back to defaults when the environment
/// cannot be read.
fn load_config() -> ApiConfig {
    match ApiConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            // tracing is not installed yet
            eprintln!("Invalid API configuration ({e}); using defaults");
            ApiConfig::default()
        }
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// # Arguments
///
/// * `log_level` - The minimum log level to output (trace, debug, info, warn, error)
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// This enables graceful shutdown of the server, allowing in-flight
/// requests to complete before the process exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

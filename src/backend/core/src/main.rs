//! Vigil Server - Main entry point
//!
//! Serves readiness, liveness and metrics endpoints for the probes listed in
//! the configuration.

use clap::Parser;

use vigil_core::{
    api::{self, AppState},
    config::Config,
    health::HealthChecker,
    telemetry,
};

/// Vigil health-check server
#[derive(Parser)]
#[command(name = "vigil-server", version, about)]
struct Args {
    /// Path to a configuration file (overrides VIGIL_CONFIG)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = match args.config.as_deref() {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };

    let metrics = telemetry::init_telemetry(&config.logging, &config.metrics)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Vigil Server"
    );

    let checker = HealthChecker::from_probe_specs(config.health.clone(), &config.probes)?;
    tracing::info!(
        probes = ?checker.names(),
        timeout_ms = checker.timeout().as_millis() as u64,
        "Health checker initialized"
    );

    let app = api::build_router(AppState::new(checker, metrics));

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Starting HTTP server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Wait for shutdown signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

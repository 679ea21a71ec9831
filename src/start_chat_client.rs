//! Startup helpers for the chat client server.

use std::future::Future;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;

use crate::config::ChatClientConfig;
use crate::server::{self, AppState};

/// Run the server until Ctrl-C.
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting Perfomai chat v{}", env!("CARGO_PKG_VERSION"));

    let state = match initialize() {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to initialize: {e:#}");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = rt.block_on(run_server_with_shutdown(state, shutdown_signal())) {
        tracing::error!("Server error: {e:#}");
        return ExitCode::from(1);
    }

    tracing::info!("Perfomai chat stopped");
    ExitCode::SUCCESS
}

/// Load the configuration and build application state without starting the server.
///
/// # Errors
/// Returns an error if the configuration is invalid or state creation fails.
pub fn initialize() -> anyhow::Result<Arc<AppState>> {
    let config = ChatClientConfig::from_env().context("invalid configuration")?;
    tracing::info!("Webhook endpoint: {}", config.webhook_url);
    AppState::new(config).context("failed to create state")
}

/// Run server with graceful shutdown.
///
/// # Errors
/// Returns an error if the server fails.
pub async fn run_server_with_shutdown<F>(state: Arc<AppState>, shutdown_signal: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    server::run_server_with_shutdown(state, shutdown_signal)
        .await
        .context("http server failed")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

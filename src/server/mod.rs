//! HTTP server for the ChatVault API.
//!
//! Provides REST endpoints for conversation CRUD, message exchange with
//! the configured AI provider, end-of-conversation analysis, and
//! cross-conversation querying.

pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;

use crate::error::{ChatVaultError, Result};
use std::future::Future;
use std::sync::Arc;

/// Start the HTTP server.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn run_server(state: Arc<AppState>, host: &str, port: u16) -> Result<()> {
    run_server_with_shutdown(state, host, port, shutdown_signal()).await
}

/// Start the HTTP server with graceful shutdown support.
///
/// The server stops accepting new connections when `shutdown` completes.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn run_server_with_shutdown<F>(
    state: Arc<AppState>,
    host: &str,
    port: u16,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);

    let addr = format!("{}:{}", host, port);
    tracing::info!("ChatVault server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ChatVaultError::Config(format!("Failed to bind {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ChatVaultError::Io(e))?;

    Ok(())
}

/// Resolves on Ctrl-C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}

// HTTP boundary - maps requests onto the ledger service
pub mod dto;
mod error;
pub mod handlers;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tracing::info;

use crate::application::LedgerService;
use crate::config::ServerConfig;

pub type SharedService = Arc<LedgerService>;

/// Build the API router.
pub fn router(service: SharedService) -> Router {
    Router::new()
        .route("/clientes/{id}/transacoes", post(handlers::submit_transaction))
        .route("/clientes/{id}/extrato", get(handlers::statement))
        .with_state(service)
}

/// Serve the API until Ctrl-C.
pub async fn serve(config: &ServerConfig, service: SharedService) -> Result<()> {
    let listener = TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.addr))?;
    info!(addr = %config.addr, "listening");

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until the process is killed
        std::future::pending::<()>().await;
    }
}

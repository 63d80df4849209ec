//! oauthgate web server.
//!
//! Serves a session-gated home page, an admin-gated page, and one OAuth2
//! callback route per identity provider. Visitors without a session get a
//! landing page with provider login links.

pub mod app;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod pages;

use std::sync::Arc;

use oauthgate_core::Result;

use crate::app::{AppState, build_router};
use crate::config::ServerConfig;
use crate::error::StartupError;

/// Builds the application from `config` and serves it until Ctrl-C.
///
/// # Errors
///
/// Returns an error if a component rejects its configuration, the listen
/// address cannot be bound, or the server loop fails.
pub async fn serve(config: ServerConfig) -> Result<(), StartupError> {
    let state = Arc::new(AppState::from_config(&config)?);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| StartupError::Bind {
            addr: config.listen_addr.clone(),
            details: e.to_string(),
        })?;

    tracing::info!(host = %config.host, "listening on http://{}", config.listen_addr);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| StartupError::Serve {
            details: e.to_string(),
        })?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

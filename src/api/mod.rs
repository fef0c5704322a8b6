//! HTTP and WebSocket surface
//!
//! A permissive-CORS axum server exposing the chat WebSocket and a plain
//! liveness probe.

pub mod health;
pub mod websocket;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::Result;
use crate::relay::Relay;

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub relay: Arc<Relay>,
}

/// Assemble the full router: health probe plus the WebSocket endpoint.
#[must_use]
pub fn router(state: Arc<ApiState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(health::router())
        .merge(websocket::router(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until interrupted.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<ApiState>, port: u16) -> Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(port, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler failed");
    }
}

//! HTTP surface for Jarvis.
//!
//! - `POST /ask`: answer a prompt
//! - `GET /health`: status plus stored memory count
//! - `GET /`: static liveness message

pub mod routes;
pub mod state;

use axum::Router;
use axum::routing::{get, post};
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Errors raised while binding or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Build the router with every route and the trace layer.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/ask", post(routes::ask))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> Result<(), ServerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    let local = listener.local_addr()?;
    info!("jarvis server listening (addr={local})");
    axum::serve(listener, create_router(state)).await?;
    Ok(())
}

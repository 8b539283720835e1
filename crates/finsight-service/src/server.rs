//! HTTP server setup.

use std::net::SocketAddr;

use axum::{
    routing::{get, post},
    Router,
};
use tracing::info;

use crate::handlers;
use crate::state::AppState;

/// Build the gateway router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/analyze_news", post(handlers::analyze_news))
        .route("/detect_fraud", post(handlers::detect_fraud))
        .route("/chatbot", post(handlers::chatbot))
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
}

/// Run the HTTP server until the shutdown signal resolves.
pub async fn run_server_with_shutdown<F>(
    addr: SocketAddr,
    state: AppState,
    shutdown_signal: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let app = router(state);

    info!("HTTP server ready on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("HTTP server shutdown complete");
    Ok(())
}

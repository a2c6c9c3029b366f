use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::AppState;

use super::handlers;

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/board", get(handlers::get_board))
        .route("/api/status", get(handlers::get_status))
        .route("/api/routes", get(handlers::get_routes))
        .route("/api/healthz", get(handlers::healthz))
        // Middleware
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(4096))
        // Shared state
        .with_state(state)
}

/// Run the axum web server on the configured bind address.
pub async fn run(state: Arc<AppState>) {
    let addr = match state.config.bind_addr() {
        Ok(addr) => addr,
        Err(e) => {
            error!("[WEB] {}", e);
            return;
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => {
            info!("[WEB] Server listening on http://{}", addr);
            l
        }
        Err(e) => {
            error!("[WEB] Failed to bind {}: {}", addr, e);
            return;
        }
    };

    let shutdown = state.shutdown.clone();
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .ok();

    info!("[WEB] Server stopped");
}

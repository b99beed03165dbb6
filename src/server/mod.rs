//! HTTP endpoint layer.
//!
//! Routes:
//!   GET  /health         - liveness probe
//!   POST /analyze        - quick classification
//!   POST /analyze_audio  - speech-pattern observation (multipart)
//!   POST /final_report   - structured report and scores

pub mod error;
pub mod handlers;
pub mod state;

pub use state::AppState;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/analyze", post(handlers::analyze))
        .route(
            "/analyze_audio",
            post(handlers::analyze_audio).layer(upload_limit),
        )
        .route("/final_report", post(handlers::final_report))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `bind_address` and serve until Ctrl+C.
pub async fn serve(bind_address: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

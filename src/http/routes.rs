use super::state::AppState;
use super::{handlers, ws};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Service info + health
        .route("/", get(handlers::service_info))
        .route("/health", get(handlers::health_check))
        // Media connection negotiation
        .route("/offer", post(handlers::offer))
        // Answer submission → evaluation job
        .route("/answers", post(handlers::submit_answer))
        // Per-session client channel
        .route("/ws/:session_id", get(ws::client_channel))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

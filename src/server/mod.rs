mod handlers;

use crate::components::Pipeline;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use handlers::{health_handler, inbound_handler};

/// Largest inbound message accepted, attachments included
const MAX_MESSAGE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    /// Shared by every request, holds no mutable state
    pub pipeline: Arc<Pipeline>,
}

/// Build the webhook router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/inbound", post(inbound_handler))
        .layer(DefaultBodyLimit::max(MAX_MESSAGE_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

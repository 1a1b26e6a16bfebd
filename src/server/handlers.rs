use super::AppState;
use crate::components::{InboundMessage, PipelineOutcome};
use axum::{body::Bytes, extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::{debug, warn};

// Handler for API health check
pub async fn health_handler() -> &'static str {
    "OK"
}

/// Runs the pipeline over a raw RFC 822 message posted as the request body
pub async fn inbound_handler(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    if body.is_empty() {
        warn!("Rejecting empty inbound message");
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "status": "empty_message" })),
        )
            .into_response();
    }

    debug!("Received inbound message of {} bytes", body.len());
    let message = InboundMessage::parse(&body);
    let outcome = state.pipeline.process(&message).await;

    let status = match outcome {
        PipelineOutcome::ExtractionFailed { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::OK,
    };
    (status, Json(outcome)).into_response()
}

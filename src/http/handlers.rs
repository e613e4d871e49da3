use super::state::AppState;
use crate::jobs::EVALUATION_RUBRIC;
use crate::media::{NegotiationError, SessionDescription};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct OfferRequest {
    pub sdp: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "sessionId", alias = "session_id")]
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub sdp: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswerSubmission {
    #[serde(rename = "recordId", alias = "record_id")]
    pub record_id: i64,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub status: String,
    #[serde(rename = "recordId")]
    pub record_id: i64,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /offer
/// Negotiate a media connection for a session and attach its pipelines.
pub async fn offer(
    State(state): State<AppState>,
    Json(req): Json<OfferRequest>,
) -> impl IntoResponse {
    let session_id = req.session_id;
    info!("[{}] media connection offer received", session_id);

    let offer = SessionDescription {
        sdp: req.sdp,
        kind: req.kind,
    };

    // Atomic commit: pipelines attach only after negotiation succeeded in
    // full, so a failed offer leaves nothing half-wired.
    let connection = match state.engine.negotiate(&session_id, offer).await {
        Ok(connection) => connection,
        Err(e) => {
            error!("[{}] negotiation failed: {}", session_id, e);
            let status = match e {
                NegotiationError::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            };
            return (
                status,
                Json(ErrorResponse {
                    error: format!("negotiation failed: {}", e),
                }),
            )
                .into_response();
        }
    };

    let answer = state.sessions.attach(&state.context, &session_id, connection);

    (
        StatusCode::OK,
        Json(AnswerResponse {
            sdp: answer.sdp,
            kind: answer.kind,
        }),
    )
        .into_response()
}

/// POST /answers
/// Store-side record id plus the question/answer pair; dispatches an
/// evaluation job with the fixed rubric. Fire-and-forget: the worker writes
/// its verdict to the store out of band.
pub async fn submit_answer(
    State(state): State<AppState>,
    Json(req): Json<AnswerSubmission>,
) -> impl IntoResponse {
    info!("[record {}] answer submitted for evaluation", req.record_id);

    if let Err(e) = state
        .context
        .dispatcher
        .submit_evaluation(req.record_id, &req.question, &req.answer, EVALUATION_RUBRIC)
        .await
    {
        error!("[record {}] evaluation dispatch failed: {}", req.record_id, e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("failed to enqueue evaluation: {}", e),
            }),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        Json(SubmissionResponse {
            status: "submitted".to_string(),
            record_id: req.record_id,
        }),
    )
        .into_response()
}

/// GET /
/// Service info
pub async fn service_info(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "service": state.service_name,
        "status": "running",
        "websocket_endpoint": "/ws/{session_id}",
        "webrtc_endpoint": "/offer",
        "transcription_enabled": state.transcription_enabled(),
        "active_sessions": state.sessions.active_sessions(),
    }))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

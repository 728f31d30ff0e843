//! HTTP request handlers

use super::types::{
    ChatRequest, ErrorResponse, HealthResponse, ResetRequest, ResetResponse, StatsResponse,
};
use super::AppState;
use crate::runtime::TurnReply;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/reset_conversation", post(reset_conversation))
        .route("/stats/:session_id", get(get_stats))
        .route("/health", get(health))
        .route("/version", get(get_version))
        .fallback(not_found)
        .with_state(state)
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<TurnReply>, AppError> {
    let Json(req) = payload.map_err(|e| {
        tracing::debug!(error = %e, "Rejected chat body");
        AppError::BadRequest("Message is required".to_string())
    })?;

    let message = req
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Message is required".to_string()))?;

    let reply = state
        .runtime
        .handle_turn(req.session_id.as_deref(), &message)
        .await;
    Ok(Json(reply))
}

/// Always succeeds; a missing body or unknown id is a no-op
async fn reset_conversation(
    State(state): State<AppState>,
    payload: Result<Json<ResetRequest>, JsonRejection>,
) -> Json<ResetResponse> {
    let req = payload.map(|Json(req)| req).unwrap_or_default();
    if let Some(id) = req.session_id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        state.runtime.reset(id).await;
    }
    Json(ResetResponse::done())
}

async fn get_stats(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<StatsResponse> {
    let response = match state.runtime.stats(&session_id).await {
        Some(stats) => StatsResponse::Stats(stats),
        None => StatsResponse::no_data(),
    };
    Json(response)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        sessions: state.runtime.session_count().await,
    })
}

async fn get_version() -> &'static str {
    concat!("glucose-companion ", env!("CARGO_PKG_VERSION"))
}

async fn not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}

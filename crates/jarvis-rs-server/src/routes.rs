//! Route handlers.

use crate::state::AppState;
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use jarvis_rs_core::JarvisCoreError;
use jarvis_rs_protocol::{
    AskRequest, AskResponse, ErrorResponse, HealthResponse, MISSING_PROMPT, RootResponse,
};
use log::{debug, error};
use std::sync::Arc;

/// Error returned by the ask route.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<JarvisCoreError> for ApiError {
    fn from(err: JarvisCoreError) -> Self {
        let (status, message) = match &err {
            JarvisCoreError::EmptyPrompt => (StatusCode::BAD_REQUEST, MISSING_PROMPT.to_string()),
            JarvisCoreError::Generation(inner) => (StatusCode::BAD_GATEWAY, inner.to_string()),
            JarvisCoreError::Config(_) => {
                error!("ask failed (err={err})");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };
        Self { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse::new(self.message))).into_response()
    }
}

/// `POST /ask`
///
/// A body that is not a JSON object with a string `prompt` is treated as an
/// empty prompt.
pub async fn ask(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<AskResponse>, ApiError> {
    let request: AskRequest = serde_json::from_slice(&body).unwrap_or_else(|err| {
        debug!("ask body not decodable; treating as empty (err={err})");
        AskRequest::default()
    });
    let reply = state.orchestrator.ask(&request.prompt).await?;
    Ok(Json(reply.into_response()))
}

/// `GET /health`
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(
        state.orchestrator.memory_count().await,
    ))
}

/// `GET /`
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse::default())
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::matching::parser::MalformedResponseError;
use crate::matching::validation::ValidationError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// No partial result is ever returned alongside an error.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("{0}")]
    MalformedResponse(#[from] MalformedResponseError),
}

impl AppError {
    /// HTTP status and machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            AppError::Llm(LlmError::Authentication { .. }) => {
                (StatusCode::BAD_GATEWAY, "AUTHENTICATION_ERROR")
            }
            AppError::Llm(LlmError::RateLimited { .. }) => {
                (StatusCode::BAD_GATEWAY, "RATE_LIMIT_ERROR")
            }
            AppError::Llm(LlmError::Timeout { .. }) => {
                (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT_ERROR")
            }
            AppError::Llm(LlmError::Provider { .. }) => (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR"),
            AppError::MalformedResponse(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "MALFORMED_RESPONSE")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!("{code}: {self}");
        } else {
            tracing::warn!("{code}: {self}");
        }

        let mut error: Value = json!({
            "code": code,
            "message": self.to_string(),
        });

        match &self {
            AppError::Validation(e) => error["side"] = json!(e.side),
            AppError::MalformedResponse(e) => error["fragment"] = json!(e.fragment),
            _ => {}
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

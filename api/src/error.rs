use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use triage_core::error::{ApiError, codes};
use triage_core::validation::ValidationError;

/// Internal error type that converts to structured API responses
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Boundary validation failure (400 or 413)
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Internal error (500)
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(ValidationError::PayloadTooLarge { .. }) => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = uuid::Uuid::now_v7().to_string();
        let status = self.status();

        let api_error = match self {
            AppError::Validation(err) => {
                tracing::debug!(
                    request_id = %request_id,
                    code = err.code(),
                    field = err.field(),
                    "Request rejected"
                );
                ApiError {
                    success: false,
                    error: err.code().to_string(),
                    message: err.to_string(),
                    field: err.field().map(str::to_string),
                    details: err.details().cloned(),
                    request_id,
                    timestamp: now_rfc3339(),
                    docs_hint: Some(
                        "Check the request body against GET /api-doc/openapi.json.".to_string(),
                    ),
                }
            }
            AppError::Internal(msg) => {
                tracing::error!(request_id = %request_id, "Internal error: {}", msg);
                ApiError {
                    success: false,
                    error: codes::INTERNAL_ERROR.to_string(),
                    message: "An internal error occurred".to_string(),
                    field: None,
                    details: None,
                    request_id,
                    timestamp: now_rfc3339(),
                    docs_hint: None,
                }
            }
        };

        (status, Json(api_error)).into_response()
    }
}

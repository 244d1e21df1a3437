//! Extractors that convert axum rejections to structured AppError responses.
//!
//! Ticket endpoints read raw bytes and validate them field by field. Smaller
//! typed bodies use `AppJson<T>` in place of `axum::Json<T>` so a bad body
//! still produces the JSON error shape instead of axum's plain-text 422.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use triage_core::validation::ValidationError;

use crate::error::AppError;

pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(map_json_rejection(rejection)),
        }
    }
}

/// Syntax errors and wrong content types are `malformed_json`; well-formed
/// JSON with the wrong shape is `invalid_input`.
pub fn map_json_rejection(rejection: JsonRejection) -> AppError {
    let body_text = rejection.body_text();
    let err = match rejection {
        JsonRejection::JsonDataError(_) => ValidationError::InvalidInput {
            message: format!("Invalid request body: {body_text}"),
            field: Some(extract_field_from_serde_message(&body_text).unwrap_or("body".to_string())),
            details: None,
        },
        _ => ValidationError::MalformedJson { reason: body_text },
    };
    AppError::Validation(err)
}

/// Try to extract a field name from serde's error messages.
fn extract_field_from_serde_message(msg: &str) -> Option<String> {
    for pattern in ["missing field `", "unknown field `"] {
        if let Some(start) = msg.find(pattern) {
            let after = &msg[start + pattern.len()..];
            if let Some(end) = after.find('`') {
                return Some(after[..end].to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_missing_field_name() {
        let msg = "Failed to deserialize: missing field `final_text` at line 1 column 20";
        assert_eq!(
            extract_field_from_serde_message(msg),
            Some("final_text".to_string())
        );
    }

    #[test]
    fn extracts_unknown_field_name() {
        let msg = "unknown field `foo`, expected one of `draft_text`, `final_text`";
        assert_eq!(
            extract_field_from_serde_message(msg),
            Some("foo".to_string())
        );
    }

    #[test]
    fn returns_none_for_generic_error() {
        let msg = "invalid type: string, expected u64";
        assert_eq!(extract_field_from_serde_message(msg), None);
    }
}

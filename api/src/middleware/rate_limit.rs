use axum::Json;
use axum::http::{HeaderValue, Response, StatusCode};
use axum::response::IntoResponse;
use tower_governor::{
    GovernorError, GovernorLayer, governor::GovernorConfigBuilder,
    key_extractor::SmartIpKeyExtractor,
};
use triage_core::error::{ApiError, codes};

use crate::error::now_rfc3339;

type RateLimitLayer =
    GovernorLayer<SmartIpKeyExtractor, governor::middleware::NoOpMiddleware, axum::body::Body>;

/// Rate limit for /api/v1/*: 120 requests/minute per IP.
pub fn triage_layer() -> RateLimitLayer {
    GovernorLayer::new(
        GovernorConfigBuilder::default()
            .per_millisecond(500) // 120 per minute = 2 per second replenish
            .burst_size(30)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .expect("invalid governor config for triage"),
    )
    .error_handler(json_error_handler)
}

/// Return the rate-limit rejection in ApiError format with a Retry-After header.
fn json_error_handler(err: GovernorError) -> Response<axum::body::Body> {
    let (status, retry_after, code, message) = match err {
        GovernorError::TooManyRequests { wait_time, .. } => (
            StatusCode::TOO_MANY_REQUESTS,
            Some(wait_time),
            codes::RATE_LIMITED,
            format!("Too many requests. Retry after {wait_time} seconds."),
        ),
        GovernorError::UnableToExtractKey => (
            StatusCode::INTERNAL_SERVER_ERROR,
            None,
            codes::INTERNAL_ERROR,
            "Unable to determine client identity for rate limiting".to_string(),
        ),
        GovernorError::Other { code, msg, .. } => (
            code,
            None,
            codes::INTERNAL_ERROR,
            msg.unwrap_or_default().to_string(),
        ),
    };

    let body = ApiError {
        success: false,
        error: code.to_string(),
        message,
        field: None,
        details: retry_after.map(|secs| serde_json::json!({ "retry_after_seconds": secs })),
        request_id: uuid::Uuid::now_v7().to_string(),
        timestamp: now_rfc3339(),
        docs_hint: None,
    };

    let mut response = (status, Json(body)).into_response();
    if let Some(secs) = retry_after {
        response
            .headers_mut()
            .insert("retry-after", HeaderValue::from(secs));
    }
    response
}

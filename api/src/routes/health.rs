use axum::{Json, Router, routing::get};

use crate::HealthResponse;
use crate::error::now_rfc3339;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Liveness check. The service has no backing store, so it is healthy
/// whenever it answers.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: now_rfc3339(),
    })
}

use serde::Serialize;
use utoipa::ToSchema;

/// Structured error response. Every error carries enough detail for the
/// caller to see which field or limit was violated without parsing prose.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    /// Always false for errors
    pub success: bool,
    /// Machine-readable error code (e.g. "invalid_input", "payload_too_large")
    pub error: String,
    /// Human-readable description of what went wrong
    pub message: String,
    /// Which field caused the error (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Structured detail: limits, actual sizes, missing fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Request ID for tracing and debugging
    pub request_id: String,
    /// RFC 3339 timestamp of the failure
    pub timestamp: String,
    /// Hint about what the correct usage looks like
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs_hint: Option<String>,
}

/// Error codes used across the API
pub mod codes {
    pub const MALFORMED_JSON: &str = "malformed_json";
    pub const INVALID_INPUT: &str = "invalid_input";
    pub const PAYLOAD_TOO_LARGE: &str = "payload_too_large";
    pub const RATE_LIMITED: &str = "rate_limited";
    pub const INTERNAL_ERROR: &str = "internal_error";
}

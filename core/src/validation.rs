//! Boundary validation for incoming ticket payloads.
//!
//! The engine itself assumes valid input. Everything a caller can get wrong
//! is caught here and reported as one of three codes: `malformed_json`,
//! `invalid_input` or `payload_too_large`. Checks run in a fixed order and
//! the first violation is reported.

use serde_json::{Value, json};

use crate::error::codes;
use crate::ticket::TicketRequest;

pub const MAX_SUBJECT_CHARS: usize = 500;
pub const MAX_MESSAGE_CHARS: usize = 10_000;
pub const MAX_CONVERSATION_MESSAGES: usize = 50;
pub const MAX_CUSTOMER_NAME_CHARS: usize = 100;
pub const MAX_ATTACHMENTS: usize = 10;
pub const MAX_PAYLOAD_BYTES: usize = 1_048_576;

pub const REQUIRED_FIELDS: [&str; 3] = ["subject", "latest_message", "conversation_history"];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Request body must be valid JSON: {reason}")]
    MalformedJson { reason: String },
    #[error("{message}")]
    InvalidInput {
        message: String,
        field: Option<String>,
        details: Option<Value>,
    },
    #[error("{message}")]
    PayloadTooLarge {
        message: String,
        field: Option<String>,
        details: Value,
    },
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MalformedJson { .. } => codes::MALFORMED_JSON,
            ValidationError::InvalidInput { .. } => codes::INVALID_INPUT,
            ValidationError::PayloadTooLarge { .. } => codes::PAYLOAD_TOO_LARGE,
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::MalformedJson { .. } => None,
            ValidationError::InvalidInput { field, .. }
            | ValidationError::PayloadTooLarge { field, .. } => field.as_deref(),
        }
    }

    pub fn details(&self) -> Option<&Value> {
        match self {
            ValidationError::MalformedJson { .. } => None,
            ValidationError::InvalidInput { details, .. } => details.as_ref(),
            ValidationError::PayloadTooLarge { details, .. } => Some(details),
        }
    }

    fn invalid(message: impl Into<String>, field: impl Into<String>) -> Self {
        ValidationError::InvalidInput {
            message: message.into(),
            field: Some(field.into()),
            details: None,
        }
    }

    fn too_long(field: &str, max_length: usize, actual: usize) -> Self {
        ValidationError::PayloadTooLarge {
            message: format!("Field '{field}' exceeds maximum length of {max_length} characters"),
            field: Some(field.to_string()),
            details: json!({
                "field": field,
                "max_length": max_length,
                "actual_length": actual,
            }),
        }
    }
}

pub fn check_payload_size(len: usize) -> Result<(), ValidationError> {
    if len > MAX_PAYLOAD_BYTES {
        return Err(oversized_payload(len));
    }
    Ok(())
}

pub fn oversized_payload(len: usize) -> ValidationError {
    ValidationError::PayloadTooLarge {
        message: format!("Request exceeds maximum size of {MAX_PAYLOAD_BYTES} bytes"),
        field: None,
        details: json!({
            "request_size_bytes": len,
            "max_size_bytes": MAX_PAYLOAD_BYTES,
        }),
    }
}

/// Size guard, JSON parse and field validation in one step.
pub fn parse_payload(bytes: &[u8]) -> Result<TicketRequest, ValidationError> {
    check_payload_size(bytes.len())?;
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| ValidationError::MalformedJson {
            reason: e.to_string(),
        })?;
    validate_payload(&value)
}

pub fn validate_payload(value: &Value) -> Result<TicketRequest, ValidationError> {
    let Some(obj) = value.as_object().filter(|o| !o.is_empty()) else {
        return Err(ValidationError::MalformedJson {
            reason: "body must be a non-empty JSON object".to_string(),
        });
    };

    let missing: Vec<&str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| match obj.get(*field) {
            None | Some(Value::Null) => true,
            Some(v) if *field == "conversation_history" => !v.is_array(),
            Some(_) => false,
        })
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::InvalidInput {
            message: format!("Missing or invalid required fields: {}", missing.join(", ")),
            field: missing.first().map(|f| f.to_string()),
            details: Some(json!({
                "missing_fields": missing,
                "required_fields": REQUIRED_FIELDS,
            })),
        });
    }

    let subject = require_string(obj.get("subject"), "subject")?;
    let subject_len = subject.chars().count();
    if subject_len > MAX_SUBJECT_CHARS {
        return Err(ValidationError::too_long("subject", MAX_SUBJECT_CHARS, subject_len));
    }

    let latest_message = require_string(obj.get("latest_message"), "latest_message")?;
    let message_len = latest_message.chars().count();
    if message_len > MAX_MESSAGE_CHARS {
        return Err(ValidationError::too_long(
            "latest_message",
            MAX_MESSAGE_CHARS,
            message_len,
        ));
    }

    let history = obj
        .get("conversation_history")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    if history.len() > MAX_CONVERSATION_MESSAGES {
        return Err(ValidationError::PayloadTooLarge {
            message: format!(
                "Conversation history exceeds maximum of {MAX_CONVERSATION_MESSAGES} messages"
            ),
            field: Some("conversation_history".to_string()),
            details: json!({
                "message_count": history.len(),
                "max_messages": MAX_CONVERSATION_MESSAGES,
            }),
        });
    }
    for (idx, item) in history.iter().enumerate() {
        validate_history_item(idx, item)?;
    }

    match obj.get("customer_name") {
        None | Some(Value::Null) => {}
        Some(Value::String(name)) => {
            let len = name.chars().count();
            if len > MAX_CUSTOMER_NAME_CHARS {
                return Err(ValidationError::too_long(
                    "customer_name",
                    MAX_CUSTOMER_NAME_CHARS,
                    len,
                ));
            }
        }
        Some(_) => {
            return Err(ValidationError::invalid(
                "Field 'customer_name' must be a string",
                "customer_name",
            ));
        }
    }

    match obj.get("metadata") {
        None | Some(Value::Null) => {}
        Some(Value::Object(metadata)) => {
            for key in ["order_number", "product"] {
                match metadata.get(key) {
                    None | Some(Value::Null) | Some(Value::String(_)) => {}
                    Some(_) => {
                        return Err(ValidationError::invalid(
                            format!("Field 'metadata.{key}' must be a string"),
                            format!("metadata.{key}"),
                        ));
                    }
                }
            }
            match metadata.get("attachments") {
                None | Some(Value::Null) => {}
                Some(Value::Array(items)) if items.len() > MAX_ATTACHMENTS => {
                    return Err(ValidationError::PayloadTooLarge {
                        message: format!("Too many attachments (maximum {MAX_ATTACHMENTS})"),
                        field: Some("metadata.attachments".to_string()),
                        details: json!({
                            "attachment_count": items.len(),
                            "max_attachments": MAX_ATTACHMENTS,
                        }),
                    });
                }
                Some(Value::Array(_)) => {}
                Some(_) => {
                    return Err(ValidationError::invalid(
                        "Field 'metadata.attachments' must be an array",
                        "metadata.attachments",
                    ));
                }
            }
        }
        Some(_) => {
            return Err(ValidationError::invalid(
                "Field 'metadata' must be an object",
                "metadata",
            ));
        }
    }

    let mut normalized = value.clone();
    strip_nulls(&mut normalized);
    serde_json::from_value(normalized).map_err(|e| ValidationError::InvalidInput {
        message: format!("Invalid request body: {e}"),
        field: None,
        details: None,
    })
}

fn require_string<'a>(value: Option<&'a Value>, field: &str) -> Result<&'a str, ValidationError> {
    value
        .and_then(Value::as_str)
        .ok_or_else(|| ValidationError::invalid(format!("Field '{field}' must be a string"), field))
}

fn validate_history_item(idx: usize, item: &Value) -> Result<(), ValidationError> {
    let field = format!("conversation_history[{idx}]");
    let Some(msg) = item.as_object() else {
        return Err(ValidationError::invalid(
            format!("Message at index {idx} must be an object"),
            field,
        ));
    };

    match msg.get("role").and_then(Value::as_str) {
        Some("customer") | Some("agent") => {}
        _ => {
            return Err(ValidationError::invalid(
                format!("Message at index {idx} must have role 'customer' or 'agent'"),
                format!("{field}.role"),
            ));
        }
    }

    let Some(text) = msg.get("text").and_then(Value::as_str) else {
        return Err(ValidationError::invalid(
            format!("Message at index {idx} must contain text"),
            format!("{field}.text"),
        ));
    };
    let len = text.chars().count();
    if len > MAX_MESSAGE_CHARS {
        return Err(ValidationError::PayloadTooLarge {
            message: format!("Message at index {idx} exceeds maximum length"),
            field: Some(format!("{field}.text")),
            details: json!({
                "message_index": idx,
                "max_length": MAX_MESSAGE_CHARS,
                "actual_length": len,
            }),
        });
    }

    match msg.get("timestamp") {
        None | Some(Value::Null) | Some(Value::String(_)) => Ok(()),
        Some(_) => Err(ValidationError::invalid(
            format!("Message at index {idx} has a non-string timestamp"),
            format!("{field}.timestamp"),
        )),
    }
}

/// Optional fields may be sent as explicit nulls; serde's defaults handle
/// absent keys, so nulls are removed before the typed conversion.
fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}

use clap::Args;
use serde_json::{Value, json};
use triage_core::validation::{
    ValidationError, check_payload_size, parse_payload, validate_payload,
};
use triage_core::{TicketRequest, analyze, classify};

use crate::util::{api_request, emit, exit_error, read_json_from_file, read_text};

#[derive(Args, Clone, Debug, Default)]
pub struct TicketArgs {
    /// Full ticket payload as JSON (file path, or "-" for stdin)
    #[arg(long, conflicts_with_all = ["subject", "message"])]
    pub file: Option<String>,

    /// Ticket subject line
    #[arg(long)]
    pub subject: Option<String>,

    /// Latest customer message
    #[arg(long)]
    pub message: Option<String>,

    /// Customer display name for the greeting
    #[arg(long)]
    pub customer_name: Option<String>,

    /// Order number (e.g. FBT-2024-1234)
    #[arg(long)]
    pub order_number: Option<String>,

    /// Product string (e.g. "Apollo II Full Package")
    #[arg(long)]
    pub product: Option<String>,

    /// Attachment file name (repeatable)
    #[arg(long = "attachment")]
    pub attachments: Vec<String>,

    /// Print compact JSON
    #[arg(long)]
    pub raw: bool,
}

impl TicketArgs {
    /// Request payload in the same shape the API accepts.
    pub fn payload(&self) -> Result<Value, String> {
        if let Some(path) = &self.file {
            return read_json_from_file(path);
        }
        let (Some(subject), Some(message)) = (&self.subject, &self.message) else {
            return Err("Provide --file, or both --subject and --message".to_string());
        };

        let mut payload = json!({
            "subject": subject,
            "latest_message": message,
            "conversation_history": [],
        });
        if let Some(name) = &self.customer_name {
            payload["customer_name"] = json!(name);
        }
        let mut metadata = serde_json::Map::new();
        if let Some(order) = &self.order_number {
            metadata.insert("order_number".to_string(), json!(order));
        }
        if let Some(product) = &self.product {
            metadata.insert("product".to_string(), json!(product));
        }
        if !self.attachments.is_empty() {
            let attachments: Vec<Value> = self
                .attachments
                .iter()
                .map(|name| json!({ "filename": name }))
                .collect();
            metadata.insert("attachments".to_string(), Value::Array(attachments));
        }
        payload["metadata"] = Value::Object(metadata);
        Ok(payload)
    }
}

/// Classify, draft and gate a ticket locally.
pub fn analyze_offline(args: TicketArgs) -> i32 {
    run_offline(&args, |ticket| serde_json::to_value(analyze(ticket)))
}

/// Classification only, locally.
pub fn classify_offline(args: TicketArgs) -> i32 {
    run_offline(&args, |ticket| serde_json::to_value(classify(ticket)))
}

/// Send the ticket to a running triage API.
pub async fn draft_remote(api_url: &str, args: TicketArgs) -> i32 {
    let payload = args
        .payload()
        .unwrap_or_else(|e| exit_error(&e, Some("triage draft --help")));
    api_request(
        api_url,
        reqwest::Method::POST,
        "/api/v1/draft",
        Some(payload),
        args.raw,
    )
    .await
}

/// Validate a ticket the way the API validates a request body, size guard
/// included.
fn offline_ticket(args: &TicketArgs) -> Result<TicketRequest, ValidationError> {
    if let Some(path) = &args.file {
        let raw = read_text(path).unwrap_or_else(|e| exit_error(&e, None));
        return parse_payload(raw.as_bytes());
    }
    let payload = args
        .payload()
        .unwrap_or_else(|e| exit_error(&e, Some("triage analyze --help")));
    check_payload_size(payload.to_string().len())?;
    validate_payload(&payload)
}

fn run_offline(
    args: &TicketArgs,
    render: impl Fn(&TicketRequest) -> serde_json::Result<Value>,
) -> i32 {
    let ticket = match offline_ticket(args) {
        Ok(ticket) => ticket,
        Err(err) => {
            tracing::debug!(code = err.code(), "Ticket rejected");
            emit(&validation_error_json(&err), args.raw, false);
            return 1;
        }
    };

    match render(&ticket) {
        Ok(output) => {
            emit(&output, args.raw, true);
            0
        }
        Err(e) => exit_error(&format!("Failed to serialize result: {e}"), None),
    }
}

fn validation_error_json(err: &ValidationError) -> Value {
    let mut out = json!({
        "error": err.code(),
        "message": err.to_string(),
    });
    if let Some(field) = err.field() {
        out["field"] = json!(field);
    }
    if let Some(details) = err.details() {
        out["details"] = details.clone();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(subject: &str, message: &str) -> TicketArgs {
        TicketArgs {
            subject: Some(subject.to_string()),
            message: Some(message.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn payload_from_flags_validates() {
        let mut a = args("Where is my order?", "Where is my order #FBT-2024-1234?");
        a.order_number = Some("FBT-2024-1234".to_string());
        a.attachments = vec!["photo.jpg".to_string()];
        let payload = a.payload().expect("payload should build");
        assert_eq!(payload["metadata"]["order_number"], "FBT-2024-1234");
        assert_eq!(payload["metadata"]["attachments"][0]["filename"], "photo.jpg");

        let ticket = validate_payload(&payload).expect("payload should validate");
        assert_eq!(ticket.metadata.attachment_count(), 1);
    }

    #[test]
    fn subject_and_message_are_required_without_file() {
        let a = TicketArgs {
            subject: Some("only subject".to_string()),
            ..Default::default()
        };
        assert!(a.payload().is_err());
    }

    #[test]
    fn offline_exit_codes() {
        assert_eq!(analyze_offline(args("Order", "Where is my order?")), 0);
        assert_eq!(classify_offline(args(&"a".repeat(501), "hi")), 1);
    }

    #[test]
    fn oversized_ticket_file_is_rejected() {
        let turn = "\u{20ac}".repeat(9_000);
        let history: Vec<Value> = (0..50)
            .map(|_| json!({"role": "customer", "text": turn}))
            .collect();
        let payload = json!({
            "subject": "Miner down",
            "latest_message": "Still not hashing",
            "conversation_history": history,
        });
        let path = std::env::temp_dir().join(format!("triage-oversized-{}.json", std::process::id()));
        std::fs::write(&path, payload.to_string()).expect("temp file should write");

        let a = TicketArgs {
            file: Some(path.to_string_lossy().into_owned()),
            raw: true,
            ..Default::default()
        };
        let err = offline_ticket(&a).expect_err("over 1 MB must fail");
        assert!(matches!(err, ValidationError::PayloadTooLarge { field: None, .. }));
        assert_eq!(analyze_offline(a), 1);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn validation_errors_keep_field_and_details() {
        let err = validate_payload(&json!({
            "subject": "a".repeat(501),
            "latest_message": "hi",
            "conversation_history": []
        }))
        .expect_err("must fail");
        let out = validation_error_json(&err);
        assert_eq!(out["error"], "payload_too_large");
        assert_eq!(out["field"], "subject");
        assert_eq!(out["details"]["max_length"], 500);
    }
}

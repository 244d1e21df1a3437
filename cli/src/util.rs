use std::io::Read;

use serde_json::json;

pub fn client() -> reqwest::Client {
    reqwest::Client::new()
}

pub fn exit_error(message: &str, docs_hint: Option<&str>) -> ! {
    let mut err = json!({
        "error": "cli_error",
        "message": message
    });
    if let Some(hint) = docs_hint {
        err["docs_hint"] = json!(hint);
    }
    eprintln!("{}", pretty(&err));
    std::process::exit(4);
}

pub fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Print a JSON document to stdout (success) or stderr (failure).
pub fn emit(value: &serde_json::Value, raw: bool, ok: bool) {
    let formatted = if raw {
        value.to_string()
    } else {
        pretty(value)
    };
    if ok {
        println!("{formatted}");
    } else {
        eprintln!("{formatted}");
    }
}

/// Exit codes: 0=success (2xx), 1=client error (4xx), 2=server error (5xx),
///             3=connection error, 4=usage error
pub fn exit_code_for_status(status: u16) -> i32 {
    match status {
        200..=299 => 0,
        400..=499 => 1,
        _ => 2,
    }
}

/// Execute an API request, print the response, return a structured exit code.
pub async fn api_request(
    api_url: &str,
    method: reqwest::Method,
    path: &str,
    body: Option<serde_json::Value>,
    raw: bool,
) -> i32 {
    let url = format!("{}{path}", api_url.trim_end_matches('/'));
    tracing::debug!(%method, %url, "Sending request");

    let mut req = client().request(method, &url);
    if let Some(b) = body {
        req = req.json(&b);
    }

    let resp = match req.send().await {
        Ok(r) => r,
        Err(e) => {
            let err = json!({
                "error": "connection_error",
                "message": format!("{e}"),
                "docs_hint": "Is the triage API running? Check TRIAGE_API_URL."
            });
            eprintln!("{}", pretty(&err));
            return 3;
        }
    };

    let status = resp.status().as_u16();
    let exit_code = exit_code_for_status(status);
    let resp_body: serde_json::Value = match resp.json().await {
        Ok(v) => v,
        Err(e) => json!({"raw_error": format!("Failed to parse response as JSON: {e}")}),
    };

    emit(&resp_body, raw, exit_code == 0);
    exit_code
}

/// Read a file, or stdin when path is "-".
pub fn read_text(path: &str) -> Result<String, String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("Failed to read stdin: {e}"))?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read file '{path}': {e}"))
    }
}

/// Read JSON from a file path or stdin (when path is "-").
pub fn read_json_from_file(path: &str) -> Result<serde_json::Value, String> {
    let raw = read_text(path)?;
    serde_json::from_str(&raw).map_err(|e| format!("Invalid JSON in '{path}': {e}"))
}

use crate::dispatcher::HandlerResponse;
use http::StatusCode;
use may_minihttp::Response;
use serde_json::Value;
use tracing::error;

fn status_reason(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("Unknown")
}

const JSON_CONTENT_TYPE: &str = "Content-Type: application/json";

// The response writer only takes static header lines.
fn content_type_header(content_type: &str) -> Option<&'static str> {
    let media_type = content_type.split(';').next().unwrap_or("").trim();
    match media_type.to_ascii_lowercase().as_str() {
        "application/json" => Some(JSON_CONTENT_TYPE),
        "text/plain" => Some("Content-Type: text/plain"),
        "text/html" => Some("Content-Type: text/html"),
        "application/xml" => Some("Content-Type: application/xml"),
        _ => None,
    }
}

/// Write a handler response
///
/// String bodies are written as text, everything else as JSON. A supported
/// `content-type` set by the handler wins when it fits the body.
pub fn write_handler_response(res: &mut Response, hr: HandlerResponse) {
    res.status_code(usize::from(hr.status), status_reason(hr.status));
    let explicit = hr.get_header("content-type").and_then(content_type_header);
    match hr.body {
        Value::String(s) => {
            let header = explicit
                .filter(|h| *h != JSON_CONTENT_TYPE)
                .unwrap_or("Content-Type: text/plain");
            res.header(header);
            res.body_vec(s.into_bytes());
        }
        other => {
            res.header(explicit.unwrap_or(JSON_CONTENT_TYPE));
            match serde_json::to_vec(&other) {
                Ok(bytes) => res.body_vec(bytes),
                Err(e) => {
                    error!(error = %e, "Response body serialization failed");
                    res.status_code(500, status_reason(500));
                    res.body_vec(br#"{"error":"Response serialization failed"}"#.to_vec());
                }
            }
        }
    }
}

pub fn write_json_error(res: &mut Response, status: u16, body: Value) {
    res.status_code(usize::from(status), status_reason(status));
    res.header(JSON_CONTENT_TYPE);
    res.body_vec(body.to_string().into_bytes());
}

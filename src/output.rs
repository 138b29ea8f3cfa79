use std::error::Error as _;

use crate::error::RequestError;
use crate::types::RequestLine;

/// Serialize a [`RequestLine`] to a JSON string.
///
/// When `pretty` is `true` the output is indented for readability.
pub fn format_json(line: &RequestLine, pretty: bool) -> String {
    if pretty {
        serde_json::to_string_pretty(line).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    } else {
        serde_json::to_string(line).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}

/// Render a [`RequestLine`] in a human-readable debug format.
pub fn format_debug(line: &RequestLine) -> String {
    let mut out = String::with_capacity(128);

    out.push_str("=== Request Line ===\n");
    out.push_str(&format!("Method:  {}\n", line.method));
    out.push_str(&format!("Target:  {}\n", line.target));
    out.push_str(&format!("Version: {}\n", line.version));
    out.push_str("====================\n");
    out
}

/// Render a [`RequestLine`] in wire form on a single `\n`-terminated line.
pub fn format_wire(line: &RequestLine) -> String {
    format!("{line}\n")
}

/// Serialize a [`RequestError`] to a JSON object with its status code,
/// kind, message, and cause.
pub fn format_error(err: &RequestError) -> String {
    let value = serde_json::json!({
        "code": err.code(),
        "kind": format!("{:?}", err.kind()),
        "message": err.kind().to_string(),
        "cause": err.source().map(|cause| cause.to_string()),
    });
    value.to_string()
}

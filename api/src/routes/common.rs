use axum::http::{HeaderMap, header};
use services::ClientMetadata;
use std::net::SocketAddr;
use validator::ValidationErrors;

/// Joins every field's validation messages into one line.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .values()
        .flat_map(|errs| {
            errs.iter()
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

/// Request metadata used for device fingerprinting.
pub fn client_metadata(headers: &HeaderMap, addr: SocketAddr) -> ClientMetadata {
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };
    ClientMetadata {
        user_agent: header_str(header::USER_AGENT),
        remote_addr: addr.ip().to_string(),
        accept_language: header_str(header::ACCEPT_LANGUAGE),
    }
}

/// Quotes a CSV field when it contains a separator, quote or line break.
pub fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

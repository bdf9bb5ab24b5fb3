//! Request and response logging with automatic secret redaction.
//!
//! Sensitive query parameter values (tokens, keys, passwords) are
//! masked before a URL reaches the log stream. Payload bodies only
//! appear at trace level, truncated to a configurable length.

use tracing::{info, trace};

/// Checks if a query parameter's value should be redacted from logs.
#[must_use]
pub fn should_redact_param(name: &str) -> bool {
    let lower = name.to_lowercase();
    matches!(
        lower.as_str(),
        "token"
            | "access_token"
            | "refresh_token"
            | "api_key"
            | "apikey"
            | "api-key"
            | "secret"
            | "password"
            | "auth"
            | "authorization"
    )
}

/// Masks sensitive query parameter values in a URL.
#[must_use]
pub fn redact_url(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };
    let masked: Vec<String> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((name, _)) if should_redact_param(name) => format!("{name}=[REDACTED]"),
            _ => pair.to_string(),
        })
        .collect();
    format!("{}?{}", base, masked.join("&"))
}

/// Logs an outgoing request with an optional body preview.
pub fn log_request(method: &str, url: &str, body: Option<&str>) {
    info!(
        target: "apiloom::dispatch",
        "→ {} {}",
        method,
        redact_url(url)
    );
    log_body("Request", body);
}

/// Logs a completed exchange with an optional decoded body preview.
pub fn log_response(status: u16, duration_ms: u128, body: Option<&str>) {
    info!(
        target: "apiloom::dispatch",
        "← {} ({}ms)",
        status,
        duration_ms
    );
    log_body("Response", body);
}

fn log_body(side: &str, body: Option<&str>) {
    let Some(content) = body else {
        return;
    };
    let limit = max_body_len();
    if content.len() > limit {
        trace!(
            target: "apiloom::dispatch",
            "{} body: {} (truncated at {} bytes)",
            side,
            &content[..truncation_point(content, limit)],
            limit
        );
    } else {
        trace!(
            target: "apiloom::dispatch",
            "{} body: {}",
            side,
            content
        );
    }
}

/// Largest char boundary at or below `limit`, so truncation never
/// splits a multibyte character.
fn truncation_point(content: &str, limit: usize) -> usize {
    let mut cut = limit;
    while !content.is_char_boundary(cut) {
        cut -= 1;
    }
    cut
}

/// Gets the maximum body length from the `APILOOM_LOG_MAX_BODY`
/// environment variable, defaulting to 1000 bytes.
#[must_use]
pub fn max_body_len() -> usize {
    std::env::var("APILOOM_LOG_MAX_BODY")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(1000)
}

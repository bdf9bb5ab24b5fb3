use serde::Serialize;
use serde_json::Value;

use crate::error::Error;
use crate::payload::ResponseBody;

/// Classification of a failed call, serialized in the generator's
/// SCREAMING_CASE convention so UI code can switch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Outgoing request body failed schema validation; nothing was sent.
    ValidationError,
    /// Response arrived but violated its declared schema, a contract
    /// breach by the server; not delivered as success data.
    ResponseValidationError,
    /// Catch-all for transport and other unexpected failures.
    RequestError,
}

/// One schema violation: where it happened, what was expected, and the
/// offending value. Ordered as reported by the validation engine so UI
/// code can render field-level feedback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Instance path into the validated value, e.g. `/items/0/name`.
    pub path: String,
    /// Human-readable description of the violated constraint.
    pub constraint: String,
    /// The value that failed the constraint.
    pub value: Value,
}

/// Structured, UI-facing error carried by failed [`CallResult`]s and
/// mirrored into call state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
    /// Itemized violations for the validation kinds; empty otherwise.
    pub violations: Vec<Violation>,
    /// HTTP status when the failure carries one.
    pub status: Option<u16>,
    /// Heuristic timeout flag (transport timeout or timeout-shaped
    /// message); not a distinct kind.
    pub is_timeout: bool,
}

impl ApiError {
    /// Request-side schema failure (nothing dispatched).
    #[must_use]
    pub fn validation(violations: Vec<Violation>) -> Self {
        Self {
            kind: ErrorKind::ValidationError,
            message: "request body failed schema validation".to_string(),
            violations,
            status: None,
            is_timeout: false,
        }
    }

    /// Response-side schema failure (response discarded).
    #[must_use]
    pub fn response_validation(violations: Vec<Violation>) -> Self {
        Self {
            kind: ErrorKind::ResponseValidationError,
            message: "response failed schema validation".to_string(),
            violations,
            status: None,
            is_timeout: false,
        }
    }
}

impl From<Error> for ApiError {
    /// Folds an operational error into the UI-facing shape, defaulting the
    /// kind to [`ErrorKind::RequestError`].
    fn from(err: Error) -> Self {
        Self {
            kind: ErrorKind::RequestError,
            status: err.status(),
            is_timeout: err.is_timeout(),
            message: err.to_string(),
            violations: Vec::new(),
        }
    }
}

/// Normalized outcome envelope returned by every API method invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CallResult {
    pub success: bool,
    /// Decoded payload on success, `None` on failure.
    pub data: Option<ResponseBody>,
    /// Structured error on failure, `None` on success.
    pub error: Option<ApiError>,
    /// Human-readable status line.
    pub message: String,
}

impl CallResult {
    #[must_use]
    pub fn success(data: ResponseBody) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: "request succeeded".to_string(),
        }
    }

    #[must_use]
    pub fn failure(error: ApiError) -> Self {
        let message = if error.message.is_empty() {
            "request failed".to_string()
        } else {
            error.message.clone()
        };
        Self {
            success: false,
            data: None,
            error: Some(error),
            message,
        }
    }

    /// Convenience accessor for the JSON payload of a successful call.
    #[must_use]
    pub fn json(&self) -> Option<&Value> {
        self.data.as_ref().and_then(ResponseBody::as_json)
    }
}

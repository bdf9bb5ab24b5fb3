use thiserror::Error;

/// Errors raised by factory construction and the configuration tier of a
/// call. Operational failures (HTTP status, validation, transport) never
/// surface here; the method layer folds those into a
/// [`CallResult`](crate::result::CallResult).
#[derive(Error, Debug)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("HTTP {status}: {status_text}")]
    Http { status: u16, status_text: String },
    #[error("Missing required path parameter: {name}")]
    MissingPathParameter { name: String },
    #[error("Invalid HTTP method: {method}")]
    InvalidHttpMethod { method: String },
    #[error("Schema compilation failed for '{key}': {reason}")]
    SchemaCompile { key: String, reason: String },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

impl Error {
    /// Shorthand for a [`Error::Config`] with a formatted message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// HTTP status carried by this error, when there is one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Heuristic timeout detection: transport-level timeouts from reqwest,
    /// or a timeout-shaped message from a foreign dispatcher.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout(),
            Self::Transport(e) => {
                let msg = e.to_string().to_lowercase();
                msg.contains("timed out") || msg.contains("timeout")
            }
            _ => false,
        }
    }
}

use std::time::Duration;

/// Default deadline applied by the built-in HTTP dispatcher. There is no
/// request-level timeout elsewhere; the transport's own deadline is the
/// only one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Build-time client configuration: the base-URL / prefix collaborator
/// boundary. Consumed once when the factory builds its methods; how the
/// values are sourced (environment, config files) is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Prepended verbatim to every built URL by the HTTP dispatcher.
    /// Empty means same-origin paths are used as-is.
    pub base_url: String,
    /// Optional module mount prefix, prepended to every path template at
    /// factory-build time (e.g. `/netshare`).
    pub path_prefix: Option<String>,
    /// Transport deadline for the built-in dispatcher.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Configuration pointing at `base_url` with defaults for the rest.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Sets the module mount prefix.
    #[must_use]
    pub fn with_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = Some(prefix.into());
        self
    }

    /// Sets the transport deadline for the built-in dispatcher.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            path_prefix: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

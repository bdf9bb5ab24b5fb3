//! Reactive call wrapper: an observable state cell bound to one
//! endpoint method.
//!
//! Each consumer binds its own [`CallHandle`]; handles never share
//! state. A handle tracks a liveness flag so a call that resolves after
//! the consumer is torn down no longer writes state, while the caller
//! awaiting `call` still receives the true result.

use crate::error::Error;
use crate::method::ApiMethod;
use crate::payload::{RequestBody, ResponseBody};
use crate::result::{ApiError, CallResult};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Snapshot of one consumer's call lifecycle.
///
/// The default value is the idle state: nothing loaded, nothing in
/// flight, no verdict.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CallState {
    /// Decoded payload of the last successful call.
    pub data: Option<ResponseBody>,
    /// A call is in flight.
    pub loading: bool,
    /// Structured error of the last failed call.
    pub error: Option<ApiError>,
    pub success: bool,
    /// Human-readable status line for direct display.
    pub message: String,
    /// When the last terminal transition was applied.
    pub last_updated: Option<DateTime<Utc>>,
    /// HTTP status of the last failure that carried one.
    pub status_code: Option<u16>,
    /// Whether the last failure looked like a timeout.
    pub is_timeout: bool,
}

/// Produces [`CallHandle`]s for one endpoint. This is what the factory
/// stores under the `use<Id>` key: each consumer calls [`bind`] to get
/// its own state cell, the way a component instantiates a hook.
///
/// [`bind`]: CallHook::bind
#[derive(Debug, Clone)]
pub struct CallHook {
    method: Arc<ApiMethod>,
}

impl CallHook {
    pub(crate) fn new(method: Arc<ApiMethod>) -> Self {
        Self { method }
    }

    /// Binds a fresh handle with its own state cell and liveness flag.
    #[must_use]
    pub fn bind(&self) -> CallHandle {
        CallHandle::new(Arc::clone(&self.method))
    }
}

/// A live binding of one consumer to one endpoint method.
pub struct CallHandle {
    method: Arc<ApiMethod>,
    state: watch::Sender<CallState>,
    active: Arc<AtomicBool>,
}

impl CallHandle {
    fn new(method: Arc<ApiMethod>) -> Self {
        let (state, _) = watch::channel(CallState::default());
        Self {
            method,
            state,
            active: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Subscribes an observer to state snapshots.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CallState> {
        self.state.subscribe()
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> CallState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Marks the consumer as torn down. An in-flight call keeps running
    /// and still returns its result, but no longer touches state.
    pub fn detach(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    /// Invokes the endpoint and reflects its outcome into state.
    ///
    /// Transitions to loading synchronously, awaits the wrapped method,
    /// then applies the terminal transition if the consumer is still
    /// active. Overlapping calls on one handle are not serialized:
    /// whichever resolves last writes the final state.
    ///
    /// # Errors
    /// Propagates configuration-tier errors from the wrapped method;
    /// operational failures arrive inside the returned [`CallResult`].
    pub async fn call(
        &self,
        params: Map<String, Value>,
        body: RequestBody,
    ) -> Result<CallResult, Error> {
        self.state.send_modify(|state| {
            state.loading = true;
            state.data = None;
            state.error = None;
            state.success = false;
            state.message.clear();
        });

        let result = match self.method.call(&params, body).await {
            Ok(result) => result,
            Err(err) => {
                self.state.send_modify(|state| state.loading = false);
                return Err(err);
            }
        };

        if self.is_active() {
            self.apply(&result);
        } else {
            debug!(
                target: "apiloom::state",
                "'{}': consumer detached, dropping state update",
                self.method.id()
            );
        }
        Ok(result)
    }

    fn apply(&self, result: &CallResult) {
        self.state.send_modify(|state| {
            state.loading = false;
            state.last_updated = Some(Utc::now());
            if result.success {
                state.data = result.data.clone();
                state.error = None;
                state.success = true;
                state.message = terminal_message(result, "operation succeeded");
                state.status_code = None;
                state.is_timeout = false;
            } else {
                state.data = None;
                state.error = result.error.clone();
                state.success = false;
                state.message = terminal_message(result, "operation failed");
                state.status_code = result.error.as_ref().and_then(|e| e.status);
                state.is_timeout = result.error.as_ref().is_some_and(|e| e.is_timeout);
            }
        });
    }
}

fn terminal_message(result: &CallResult, fallback: &str) -> String {
    if result.message.is_empty() {
        fallback.to_string()
    } else {
        result.message.clone()
    }
}

//! Shared test dispatchers and definition helpers.
#![allow(dead_code)]

use apiloom::{Dispatcher, EndpointDefinition, Error, PreparedRequest, RequestBody, ResponseBody};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::oneshot;

/// Parses a JSON definition literal, panicking on shape errors.
pub fn definition(value: Value) -> EndpointDefinition {
    serde_json::from_value(value).expect("test definition must deserialize")
}

/// Dispatcher returning a fixed payload, counting invocations and
/// remembering what it was asked to send.
pub struct RecordingDispatcher {
    response: ResponseBody,
    calls: AtomicUsize,
    last_request: Mutex<Option<PreparedRequest>>,
    last_body: Mutex<Option<RequestBody>>,
}

impl RecordingDispatcher {
    pub fn returning(response: ResponseBody) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
            last_body: Mutex::new(None),
        }
    }

    pub fn returning_json(value: Value) -> Self {
        Self::returning(ResponseBody::Json(value))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<PreparedRequest> {
        self.last_request.lock().unwrap().clone()
    }

    pub fn last_body(&self) -> Option<RequestBody> {
        self.last_body.lock().unwrap().clone()
    }
}

#[async_trait]
impl Dispatcher for RecordingDispatcher {
    async fn dispatch(
        &self,
        request: PreparedRequest,
        body: RequestBody,
    ) -> Result<ResponseBody, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request);
        *self.last_body.lock().unwrap() = Some(body);
        Ok(self.response.clone())
    }
}

/// Dispatcher echoing the JSON request body back as the response.
pub struct EchoDispatcher;

#[async_trait]
impl Dispatcher for EchoDispatcher {
    async fn dispatch(
        &self,
        _request: PreparedRequest,
        body: RequestBody,
    ) -> Result<ResponseBody, Error> {
        match body {
            RequestBody::Json(value) => Ok(ResponseBody::Json(value)),
            RequestBody::Multipart(_) => Ok(ResponseBody::Text(String::new())),
        }
    }
}

/// Handle for one parked call: `arrived` fires when the call reaches
/// the transport, `release` delivers its response.
pub struct Gate {
    pub arrived: oneshot::Receiver<()>,
    pub release: oneshot::Sender<ResponseBody>,
}

/// Dispatcher that parks each call until the test releases it, so tests
/// control the order in which overlapping calls resolve.
pub struct GatedDispatcher {
    gates: Mutex<VecDeque<(oneshot::Sender<()>, oneshot::Receiver<ResponseBody>)>>,
}

impl GatedDispatcher {
    pub fn new() -> Self {
        Self {
            gates: Mutex::new(VecDeque::new()),
        }
    }

    /// Arms a gate for the next dispatched call. Calls consume gates in
    /// arrival order.
    pub fn arm(&self) -> Gate {
        let (arrived_tx, arrived_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        self.gates
            .lock()
            .unwrap()
            .push_back((arrived_tx, release_rx));
        Gate {
            arrived: arrived_rx,
            release: release_tx,
        }
    }
}

#[async_trait]
impl Dispatcher for GatedDispatcher {
    async fn dispatch(
        &self,
        _request: PreparedRequest,
        _body: RequestBody,
    ) -> Result<ResponseBody, Error> {
        let (arrived, release) = self
            .gates
            .lock()
            .unwrap()
            .pop_front()
            .expect("dispatch with no armed gate");
        let _ = arrived.send(());
        Ok(release.await.expect("gate sender dropped"))
    }
}

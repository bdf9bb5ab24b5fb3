//! Endpoint definitions in, callable API methods and reactive call
//! state out.
//!
//! Feed [`ApiFactory`] a list of endpoint definitions (HTTP method,
//! path template, parameter declarations, JSON-schema request/response
//! shapes) and it produces one validated, URL-templated method per
//! definition plus a matching [`CallHook`] that wraps each method in an
//! observable call-state cell. Request bodies are validated before
//! dispatch and responses after decoding; every operational failure
//! folds into a [`CallResult`] with a structured, classified error.
//!
//! # Example
//!
//! ```no_run
//! use apiloom::{ApiFactory, ClientConfig, RequestBody};
//! use serde_json::{json, Map};
//!
//! # async fn run() -> Result<(), apiloom::Error> {
//! let definitions = json!([{
//!     "id": "getUser",
//!     "method": "get",
//!     "path": "/users/{id}",
//!     "parameters": [{"name": "id", "type": "Path", "required": true}],
//!     "response": {"type": "object"},
//!     "responseContentType": "application/json"
//! }]);
//!
//! let api = ApiFactory::new(ClientConfig::new("https://api.example.com"))
//!     .build_from_json(&definitions)?;
//!
//! let mut params = Map::new();
//! params.insert("id".into(), json!("7"));
//! let result = api.call("getUser", &params, RequestBody::empty()).await?;
//! if result.success {
//!     println!("{:?}", result.data);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod definition;
pub mod dispatch;
pub mod error;
pub mod factory;
pub mod logging;
pub mod method;
pub mod payload;
pub mod result;
pub mod schema;
pub mod state;
pub mod url;
pub mod utils;

pub use config::ClientConfig;
pub use definition::{EndpointDefinition, ParameterKind, ParameterSpec};
pub use dispatch::{Dispatcher, HttpDispatcher, PreparedRequest};
pub use error::Error;
pub use factory::{Api, ApiFactory};
pub use method::ApiMethod;
pub use payload::{MultipartForm, PayloadFormat, RequestBody, ResponseBody};
pub use result::{ApiError, CallResult, ErrorKind, Violation};
pub use schema::ValidatorCache;
pub use state::{CallHandle, CallHook, CallState};

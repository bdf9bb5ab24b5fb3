//! Per-endpoint callable: validation, URL assembly, and dispatch
//! composed into one method.

use crate::config::ClientConfig;
use crate::definition::EndpointDefinition;
use crate::dispatch::{self, Dispatcher, PreparedRequest};
use crate::error::Error;
use crate::payload::{PayloadFormat, RequestBody, ResponseBody};
use crate::result::{ApiError, CallResult, Violation};
use crate::schema::{self, CompiledSchema, ValidatorCache};
use crate::url;
use reqwest::Method;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// A ready-to-call endpoint method.
///
/// All definition analysis happens once at build time: the HTTP method
/// is parsed, content types resolve to payload formats, and validators
/// compile through the cache. A call performs no schema compilation.
#[derive(Clone)]
pub struct ApiMethod {
    definition: EndpointDefinition,
    method: Method,
    request_format: PayloadFormat,
    response_format: PayloadFormat,
    request_validator: Option<Arc<CompiledSchema>>,
    response_validator: Option<Arc<CompiledSchema>>,
    config: ClientConfig,
    dispatcher: Arc<dyn Dispatcher>,
}

// The dispatcher is a trait object without a Debug form.
impl fmt::Debug for ApiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiMethod")
            .field("id", &self.definition.id)
            .field("method", &self.method)
            .field("path", &self.definition.path)
            .finish_non_exhaustive()
    }
}

/// Validation applies only to json-typed sides that carry a schema.
/// Upload and download endpoints are exempt.
fn json_typed(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("json"))
}

impl ApiMethod {
    /// Builds the method from its definition.
    ///
    /// # Errors
    /// Fails on an unclassifiable HTTP method or a schema that does not
    /// compile. Both are definition defects, caught at build time.
    pub fn build(
        definition: EndpointDefinition,
        config: ClientConfig,
        dispatcher: Arc<dyn Dispatcher>,
        cache: &ValidatorCache,
    ) -> Result<Self, Error> {
        let method = dispatch::parse_method(&definition.method)?;
        let request_format = PayloadFormat::for_request(definition.request_content_type.as_deref());
        let response_format =
            PayloadFormat::for_response(definition.response_content_type.as_deref());

        let request_validator = if json_typed(definition.request_content_type.as_deref()) {
            definition
                .request_body
                .as_ref()
                .filter(|schema| !schema.is_null())
                .map(|s| cache.get_or_compile(&schema::request_key(&definition.id), s))
                .transpose()?
        } else {
            None
        };
        let response_validator = if json_typed(definition.response_content_type.as_deref()) {
            definition
                .response
                .as_ref()
                .filter(|schema| !schema.is_null())
                .map(|s| cache.get_or_compile(&schema::response_key(&definition.id), s))
                .transpose()?
        } else {
            None
        };

        debug!(
            target: "apiloom::factory",
            "built method '{}' ({} {}), request validation: {}, response validation: {}",
            definition.id,
            method,
            definition.path,
            request_validator.is_some(),
            response_validator.is_some()
        );

        Ok(Self {
            definition,
            method,
            request_format,
            response_format,
            request_validator,
            response_validator,
            config,
            dispatcher,
        })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.definition.id
    }

    #[must_use]
    pub fn definition(&self) -> &EndpointDefinition {
        &self.definition
    }

    /// Invokes the endpoint.
    ///
    /// Operational failures (transport, HTTP status, schema violations)
    /// come back as a failed [`CallResult`], never as `Err`. The `Err`
    /// tier is reserved for configuration mistakes that should surface
    /// during development: a missing path parameter, a stray template
    /// placeholder, or a body whose shape contradicts the declared
    /// request content type.
    ///
    /// # Errors
    /// Returns configuration-tier errors only, as described above.
    pub async fn call(
        &self,
        params: &Map<String, Value>,
        body: RequestBody,
    ) -> Result<CallResult, Error> {
        let target = url::build_url(
            &self.config,
            &self.definition.path,
            &self.definition.parameters,
            params,
        )?;
        check_body_shape(self.request_format, &body)?;
        Ok(self.run(target, body).await)
    }

    /// Everything past the configuration tier: total over its inputs,
    /// every failure folds into the returned envelope.
    async fn run(&self, target: String, body: RequestBody) -> CallResult {
        let body = match body {
            RequestBody::Json(mut value) => {
                if let Some(validator) = &self.request_validator {
                    validator.shape(&mut value);
                    let violations = validator.check(&value);
                    if !violations.is_empty() {
                        warn!(
                            target: "apiloom::method",
                            "'{}': request body rejected with {} violation(s), not dispatched",
                            self.definition.id,
                            violations.len()
                        );
                        return CallResult::failure(ApiError::validation(violations));
                    }
                }
                // The shaped body is what goes on the wire.
                RequestBody::Json(value)
            }
            multipart => multipart,
        };

        let request = PreparedRequest {
            method: self.method.clone(),
            url: target,
            request_format: self.request_format,
            response_format: self.response_format,
        };

        match self.dispatcher.dispatch(request, body).await {
            Ok(payload) => self.accept(payload),
            Err(err) => {
                warn!(
                    target: "apiloom::method",
                    "'{}': dispatch failed: {}",
                    self.definition.id,
                    err
                );
                CallResult::failure(ApiError::from(err))
            }
        }
    }

    /// Applies response-side validation. The payload is shaped the same
    /// way request bodies are, so schema defaults fill into response
    /// data. A violating response is discarded from the success path.
    fn accept(&self, mut payload: ResponseBody) -> CallResult {
        if let Some(validator) = &self.response_validator {
            let violations = match &mut payload {
                ResponseBody::Json(value) => {
                    validator.shape(value);
                    validator.check(value)
                }
                // A json-declared endpoint that produced text is held to
                // its contract; the text is validated as a string value.
                ResponseBody::Text(text) => validator.check(&Value::String(text.clone())),
                // Binary where JSON was declared cannot satisfy any JSON
                // schema; report the contract breach directly.
                ResponseBody::Binary(_) => vec![Violation {
                    path: String::new(),
                    constraint: "expected a JSON payload, got binary".to_string(),
                    value: Value::Null,
                }],
            };
            if !violations.is_empty() {
                warn!(
                    target: "apiloom::method",
                    "'{}': response violated its schema ({} violation(s))",
                    self.definition.id,
                    violations.len()
                );
                return CallResult::failure(ApiError::response_validation(violations));
            }
        }
        CallResult::success(payload)
    }
}

/// A body whose shape contradicts the declared request format is a
/// definition/call-site mismatch, not an operational failure.
fn check_body_shape(format: PayloadFormat, body: &RequestBody) -> Result<(), Error> {
    match (format, body) {
        (PayloadFormat::Multipart, RequestBody::Json(_)) => Err(Error::config(
            "endpoint declares a multipart request but was given a JSON body",
        )),
        (PayloadFormat::Multipart, RequestBody::Multipart(_)) => Ok(()),
        (_, RequestBody::Multipart(_)) => Err(Error::config(
            "endpoint declares a JSON request but was given a multipart body",
        )),
        _ => Ok(()),
    }
}

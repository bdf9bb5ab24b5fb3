//! Transport layer: turns an abstract request tuple into a network call.
//!
//! Methods fall into two payload groups. Body-bearing methods carry
//! their payload in the request body, serialized as JSON or passed
//! through as a multipart form. Query-bearing methods fold payload
//! fields into the URL's query string instead. The [`Dispatcher`] trait
//! is the crate's only network seam; swapping the implementation swaps
//! the transport without touching any other component.

use crate::config::ClientConfig;
use crate::error::Error;
use crate::logging;
use crate::payload::{MultipartForm, PayloadFormat, RequestBody, ResponseBody};
use crate::url::render;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::str::FromStr;
use std::time::Instant;

/// How a method carries its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    /// POST, PUT, PATCH, OPTIONS, TRACE.
    BodyBearing,
    /// GET, DELETE, HEAD.
    QueryBearing,
}

/// Classifies `method` into its payload group, or `None` for methods
/// outside both groups.
#[must_use]
pub fn classify(method: &Method) -> Option<MethodKind> {
    match method.as_str() {
        "POST" | "PUT" | "PATCH" | "OPTIONS" | "TRACE" => Some(MethodKind::BodyBearing),
        "GET" | "DELETE" | "HEAD" => Some(MethodKind::QueryBearing),
        _ => None,
    }
}

/// Parses a definition's method string, case-insensitively, rejecting
/// anything outside the two payload groups.
///
/// # Errors
/// Returns [`Error::InvalidHttpMethod`] for unknown or unclassifiable
/// methods.
pub fn parse_method(method: &str) -> Result<Method, Error> {
    let normalized = method.trim().to_uppercase();
    let parsed = Method::from_str(&normalized).map_err(|_| Error::InvalidHttpMethod {
        method: method.to_string(),
    })?;
    if classify(&parsed).is_none() {
        return Err(Error::InvalidHttpMethod {
            method: method.to_string(),
        });
    }
    Ok(parsed)
}

/// The abstract request tuple handed to a dispatcher.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    /// Declared encoding of the outgoing payload.
    pub request_format: PayloadFormat,
    /// Declared encoding of the expected response. The built-in
    /// dispatcher decodes from the actual response header; alternate
    /// transports without header access can fall back to this.
    pub response_format: PayloadFormat,
}

/// Transport boundary.
///
/// The built-in implementation speaks HTTP via `reqwest`; tests and
/// alternate transports (an IPC bridge, a recording stub) substitute
/// their own without changing any other component.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Performs the network call and decodes the response payload.
    ///
    /// # Errors
    /// Fails on transport errors, non-2xx statuses, and undecodable
    /// payloads.
    async fn dispatch(
        &self,
        request: PreparedRequest,
        body: RequestBody,
    ) -> Result<ResponseBody, Error>;
}

/// Built-in HTTP dispatcher.
///
/// The client keeps a cookie store so session credentials ride along on
/// every request, matching a browser's same-origin credential model.
#[derive(Debug)]
pub struct HttpDispatcher {
    client: reqwest::Client,
}

impl HttpDispatcher {
    /// Builds the underlying HTTP client with the configured timeout.
    ///
    /// # Errors
    /// Fails when the TLS backend cannot be initialized.
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .cookie_store(true)
            .build()?;
        Ok(Self { client })
    }

    /// Wraps an existing client, keeping whatever middleware it carries.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Dispatcher for HttpDispatcher {
    async fn dispatch(
        &self,
        request: PreparedRequest,
        body: RequestBody,
    ) -> Result<ResponseBody, Error> {
        let kind = classify(&request.method).ok_or_else(|| Error::InvalidHttpMethod {
            method: request.method.to_string(),
        })?;
        let started = Instant::now();

        let (effective_url, builder, body_preview) = match kind {
            MethodKind::BodyBearing => {
                let preview = body_text(&body);
                let builder = attach_body(
                    self.client.request(request.method.clone(), &request.url),
                    request.request_format,
                    body,
                )?;
                (request.url.clone(), builder, preview)
            }
            MethodKind::QueryBearing => {
                let url = merge_query(&request.url, body)?;
                let builder = self.client.request(request.method.clone(), &url);
                (url, builder, None)
            }
        };
        logging::log_request(request.method.as_str(), &effective_url, body_preview.as_deref());

        let response = builder.send().await?;
        let status = response.status();
        let duration_ms = started.elapsed().as_millis();

        if !status.is_success() {
            logging::log_response(status.as_u16(), duration_ms, None);
            return Err(Error::Http {
                status: status.as_u16(),
                status_text: status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string(),
            });
        }

        let decoded = decode_payload(response).await?;
        logging::log_response(status.as_u16(), duration_ms, payload_preview(&decoded).as_deref());
        Ok(decoded)
    }
}

fn body_text(body: &RequestBody) -> Option<String> {
    match body {
        RequestBody::Json(value) => Some(value.to_string()),
        RequestBody::Multipart(_) => None,
    }
}

fn attach_body(
    builder: reqwest::RequestBuilder,
    format: PayloadFormat,
    body: RequestBody,
) -> Result<reqwest::RequestBuilder, Error> {
    match (format, body) {
        // The transport sets the multipart boundary header itself.
        (PayloadFormat::Multipart, RequestBody::Multipart(form)) => {
            Ok(builder.multipart(into_form(form)?))
        }
        (PayloadFormat::Multipart, RequestBody::Json(_)) => Err(Error::config(
            "multipart endpoint called with a JSON body",
        )),
        (_, RequestBody::Json(value)) => Ok(builder.json(&value)),
        (_, RequestBody::Multipart(_)) => Err(Error::config(
            "JSON endpoint called with a multipart body",
        )),
    }
}

/// Folds non-null body fields into the URL's query string, reusing `&`
/// when the URL already carries a query.
fn merge_query(url: &str, body: RequestBody) -> Result<String, Error> {
    let RequestBody::Json(value) = body else {
        return Err(Error::config(
            "query-bearing endpoint called with a multipart body",
        ));
    };
    let Value::Object(fields) = value else {
        return Ok(url.to_string());
    };
    let mut merged = url.to_string();
    let mut separator = if url.contains('?') { '&' } else { '?' };
    for (name, field) in &fields {
        if field.is_null() {
            continue;
        }
        merged.push(separator);
        merged.push_str(&urlencoding::encode(name));
        merged.push('=');
        merged.push_str(&urlencoding::encode(&render(field)));
        separator = '&';
    }
    Ok(merged)
}

fn into_form(form: MultipartForm) -> Result<reqwest::multipart::Form, Error> {
    let mut built = reqwest::multipart::Form::new();
    for part in form.into_parts() {
        let mut piece = reqwest::multipart::Part::stream(part.data);
        if let Some(filename) = part.filename {
            piece = piece.file_name(filename);
        }
        if let Some(mime) = part.mime {
            piece = piece.mime_str(&mime)?;
        }
        built = built.part(part.name, piece);
    }
    Ok(built)
}

/// Decodes the response by its actual `Content-Type` header. Without a
/// header the payload is taken as text.
async fn decode_payload(response: reqwest::Response) -> Result<ResponseBody, Error> {
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    match PayloadFormat::for_response(content_type.as_deref()) {
        PayloadFormat::Json => Ok(ResponseBody::Json(response.json::<Value>().await?)),
        PayloadFormat::Binary => Ok(ResponseBody::Binary(response.bytes().await?)),
        PayloadFormat::Multipart | PayloadFormat::Text => {
            Ok(ResponseBody::Text(response.text().await?))
        }
    }
}

fn payload_preview(payload: &ResponseBody) -> Option<String> {
    match payload {
        ResponseBody::Json(value) => Some(value.to_string()),
        ResponseBody::Text(text) => Some(text.clone()),
        ResponseBody::Binary(bytes) => Some(format!("<{} bytes>", bytes.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_payload_groups() {
        assert_eq!(classify(&Method::POST), Some(MethodKind::BodyBearing));
        assert_eq!(classify(&Method::PUT), Some(MethodKind::BodyBearing));
        assert_eq!(classify(&Method::PATCH), Some(MethodKind::BodyBearing));
        assert_eq!(classify(&Method::OPTIONS), Some(MethodKind::BodyBearing));
        assert_eq!(classify(&Method::TRACE), Some(MethodKind::BodyBearing));
        assert_eq!(classify(&Method::GET), Some(MethodKind::QueryBearing));
        assert_eq!(classify(&Method::DELETE), Some(MethodKind::QueryBearing));
        assert_eq!(classify(&Method::HEAD), Some(MethodKind::QueryBearing));
        assert_eq!(classify(&Method::CONNECT), None);
    }

    #[test]
    fn test_parse_method_is_case_insensitive() {
        assert_eq!(parse_method("get").unwrap(), Method::GET);
        assert_eq!(parse_method("Post").unwrap(), Method::POST);
        assert_eq!(parse_method(" DELETE ").unwrap(), Method::DELETE);
    }

    #[test]
    fn test_parse_method_rejects_unclassifiable() {
        assert!(matches!(
            parse_method("connect"),
            Err(Error::InvalidHttpMethod { .. })
        ));
        assert!(matches!(
            parse_method("not a method"),
            Err(Error::InvalidHttpMethod { .. })
        ));
    }

    #[test]
    fn test_merge_query_starts_with_question_mark() {
        let merged = merge_query(
            "https://api.test/search",
            RequestBody::from(json!({"q": "rust", "page": 2})),
        )
        .unwrap();
        assert_eq!(merged, "https://api.test/search?q=rust&page=2");
    }

    #[test]
    fn test_merge_query_extends_existing_query() {
        let merged = merge_query(
            "https://api.test/search?q=rust",
            RequestBody::from(json!({"page": 2})),
        )
        .unwrap();
        assert_eq!(merged, "https://api.test/search?q=rust&page=2");
    }

    #[test]
    fn test_merge_query_skips_null_fields() {
        let merged = merge_query(
            "https://api.test/search",
            RequestBody::from(json!({"q": "x", "filter": null})),
        )
        .unwrap();
        assert_eq!(merged, "https://api.test/search?q=x");
    }

    #[test]
    fn test_merge_query_with_empty_body_leaves_url_alone() {
        let merged = merge_query("https://api.test/things", RequestBody::empty()).unwrap();
        assert_eq!(merged, "https://api.test/things");
    }

    #[test]
    fn test_merge_query_rejects_multipart() {
        let err = merge_query(
            "https://api.test/things",
            RequestBody::from(MultipartForm::new().text("a", "b")),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_merge_query_percent_encodes_values() {
        let merged = merge_query(
            "https://api.test/search",
            RequestBody::from(json!({"q": "a b&c"})),
        )
        .unwrap();
        assert_eq!(merged, "https://api.test/search?q=a%20b%26c");
    }
}

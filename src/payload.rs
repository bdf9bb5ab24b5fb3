use bytes::Bytes;
use serde_json::Value;

/// Closed set of payload encodings. MIME strings are interpreted here and
/// nowhere else; every other component matches on the enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    Json,
    Multipart,
    Binary,
    Text,
}

impl PayloadFormat {
    fn from_mime(mime: &str) -> Self {
        let mime = mime.to_ascii_lowercase();
        if mime.contains("multipart") {
            Self::Multipart
        } else if mime.contains("json") {
            Self::Json
        } else if mime.contains("octet-stream") {
            Self::Binary
        } else {
            Self::Text
        }
    }

    /// Resolves a declared request content type. Absent means JSON: the
    /// serializing branch is the default for body-bearing methods.
    #[must_use]
    pub fn for_request(content_type: Option<&str>) -> Self {
        content_type.map_or(Self::Json, Self::from_mime)
    }

    /// Resolves an actual response `Content-Type` header. Absent means
    /// text: without a header there is nothing to justify parsing.
    #[must_use]
    pub fn for_response(content_type: Option<&str>) -> Self {
        content_type.map_or(Self::Text, Self::from_mime)
    }
}

/// Request payload handed to a method call.
///
/// The JSON variant covers both body-bearing methods (serialized) and
/// query-bearing ones (fields merged into the URL query by the
/// dispatcher). Defaults to an empty JSON object, so calls without a
/// payload still validate against `required` constraints the way an empty
/// body would.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Multipart(MultipartForm),
}

impl RequestBody {
    /// The default empty-object payload.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

impl Default for RequestBody {
    fn default() -> Self {
        Self::Json(Value::Object(serde_json::Map::new()))
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<MultipartForm> for RequestBody {
    fn from(form: MultipartForm) -> Self {
        Self::Multipart(form)
    }
}

/// Transport-agnostic multipart container. Passed through to the
/// transport unmodified; the transport sets the boundary and the
/// `Content-Type` header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartForm {
    parts: Vec<MultipartPart>,
}

/// One part of a [`MultipartForm`].
#[derive(Debug, Clone, PartialEq)]
pub struct MultipartPart {
    pub name: String,
    pub filename: Option<String>,
    pub mime: Option<String>,
    pub data: Bytes,
}

impl MultipartForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a plain text field.
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(MultipartPart {
            name: name.into(),
            filename: None,
            mime: None,
            data: Bytes::from(value.into()),
        });
        self
    }

    /// Adds a file field with an explicit filename and optional MIME type.
    #[must_use]
    pub fn file(
        mut self,
        name: impl Into<String>,
        filename: impl Into<String>,
        mime: Option<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        self.parts.push(MultipartPart {
            name: name.into(),
            filename: Some(filename.into()),
            mime,
            data: data.into(),
        });
        self
    }

    #[must_use]
    pub fn parts(&self) -> &[MultipartPart] {
        &self.parts
    }

    #[must_use]
    pub fn into_parts(self) -> Vec<MultipartPart> {
        self.parts
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Decoded response payload, branched from the response `Content-Type`
/// header by the dispatcher.
///
/// `Binary` carries the raw bytes unparsed; download handling stays with
/// the consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Binary(Bytes),
    Text(String),
}

impl ResponseBody {
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Binary(b) => Some(b),
            _ => None,
        }
    }
}

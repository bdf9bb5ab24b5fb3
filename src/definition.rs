use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a declared parameter is injected into the request URL.
///
/// The wire form uses the capitalized names emitted by the definition
/// generator (`"Path"` / `"Query"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum ParameterKind {
    Path,
    Query,
}

/// One declared URL parameter of an endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ParameterSpec {
    pub name: String,
    /// Serialized as `type` in the generated JSON artifacts.
    #[serde(rename = "type")]
    pub kind: ParameterKind,
    #[serde(default)]
    pub required: bool,
    /// Parameter value schema as declared in the source document. Carried
    /// for round-tripping; URL assembly does not validate against it.
    #[serde(default)]
    pub schema: Option<Value>,
}

/// Static declaration of one API operation, as emitted by the
/// OpenAPI-to-definitions generator.
///
/// Definitions are immutable inputs: the factory consumes a list of these
/// and produces one callable method and one reactive wrapper per entry.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDefinition {
    /// Unique within a definition list; method key and validator-cache key.
    pub id: String,
    /// HTTP method name, case-insensitive.
    pub method: String,
    /// URL path template with `{name}` placeholders for path parameters.
    pub path: String,
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
    /// JSON schema for the request payload, `null` when the operation
    /// takes no body.
    #[serde(default)]
    pub request_body: Option<Value>,
    #[serde(default)]
    pub request_content_type: Option<String>,
    /// JSON schema for the expected response payload.
    #[serde(default)]
    pub response: Option<Value>,
    #[serde(default)]
    pub response_content_type: Option<String>,
}

impl EndpointDefinition {
    /// Whether this definition carries a usable identifier. Only the
    /// empty string is rejected; any other id, whitespace included, is
    /// taken as-is. Definitions failing this are skipped by the factory
    /// with a warning, never fatal.
    #[must_use]
    pub fn has_valid_id(&self) -> bool {
        !self.id.is_empty()
    }
}

//! Schema compilation and the shared validator cache.
//!
//! Endpoint definitions carry raw JSON Schema documents. Compiling one
//! is much more expensive than validating against it, so compiled
//! validators are cached per endpoint under `<id>_request` and
//! `<id>_response` keys. The cache is injectable: factories fall back
//! to a process-wide instance but accept their own, which keeps tests
//! and multi-tenant setups isolated.

pub mod coerce;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;
use serde_json::Value;
use tracing::debug;

use crate::error::Error;
use crate::result::Violation;

/// Cache key for an endpoint's request-body schema.
#[must_use]
pub fn request_key(id: &str) -> String {
    format!("{id}_request")
}

/// Cache key for an endpoint's response schema.
#[must_use]
pub fn response_key(id: &str) -> String {
    format!("{id}_response")
}

/// A compiled schema paired with its source document.
///
/// The source is kept for the pre-validation shaping pass, which walks
/// `default` and `type` declarations the compiled form no longer
/// exposes.
pub struct CompiledSchema {
    validator: jsonschema::Validator,
    source: Value,
}

// The compiled validator has no Debug form; the source document
// identifies the schema well enough.
impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl CompiledSchema {
    fn compile(key: &str, schema: &Value) -> Result<Self, Error> {
        let validator = jsonschema::options()
            .should_validate_formats(true)
            // Binary payloads are declared with `format: "binary"` but
            // never carry validatable content.
            .with_format("binary", |_| true)
            .build(schema)
            .map_err(|err| Error::SchemaCompile {
                key: key.to_string(),
                reason: err.to_string(),
            })?;
        Ok(Self {
            validator,
            source: schema.clone(),
        })
    }

    /// Applies schema defaults and lossless type coercions to
    /// `instance` in place. Callers validate the shaped value, and for
    /// request bodies the shaped value is what goes on the wire.
    pub fn shape(&self, instance: &mut Value) {
        coerce::apply(&self.source, instance);
    }

    /// Collects every violation of this schema by `instance`, in the
    /// order the validation engine reports them.
    #[must_use]
    pub fn check(&self, instance: &Value) -> Vec<Violation> {
        self.validator
            .iter_errors(instance)
            .map(|err| Violation {
                path: err.instance_path.to_string(),
                constraint: err.to_string(),
                value: err.instance.into_owned(),
            })
            .collect()
    }
}

/// Concurrent map of compiled validators keyed by endpoint and side.
#[derive(Debug, Default)]
pub struct ValidatorCache {
    entries: RwLock<HashMap<String, Arc<CompiledSchema>>>,
}

impl ValidatorCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the validator cached under `key`, compiling `schema` on
    /// first use. When two callers race on the same missing key, both
    /// compile but the first insert wins and both end up sharing it.
    pub fn get_or_compile(&self, key: &str, schema: &Value) -> Result<Arc<CompiledSchema>, Error> {
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(found) = entries.get(key) {
                debug!(target: "apiloom::schema", "validator cache hit for '{}'", key);
                return Ok(Arc::clone(found));
            }
        }
        // Compile outside the lock; schema compilation can be slow.
        let compiled = Arc::new(CompiledSchema::compile(key, schema)?);
        debug!(target: "apiloom::schema", "compiled validator for '{}'", key);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(entries.entry(key.to_string()).or_insert(compiled)))
    }

    /// Number of compiled entries currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

static SHARED: Lazy<Arc<ValidatorCache>> = Lazy::new(|| Arc::new(ValidatorCache::new()));

/// Process-wide cache used by factories that are not handed their own.
#[must_use]
pub fn shared() -> Arc<ValidatorCache> {
    Arc::clone(&SHARED)
}

//! The factory: a definition list in, callable methods and reactive
//! hooks out.

use crate::config::ClientConfig;
use crate::definition::EndpointDefinition;
use crate::dispatch::{Dispatcher, HttpDispatcher};
use crate::error::Error;
use crate::method::ApiMethod;
use crate::payload::RequestBody;
use crate::result::CallResult;
use crate::schema::{self, ValidatorCache};
use crate::state::CallHook;
use crate::utils::hook_name;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Builds an [`Api`] from endpoint definitions.
///
/// The dispatcher and validator cache are both injectable; by default
/// the factory constructs the built-in HTTP dispatcher and shares the
/// process-wide cache.
pub struct ApiFactory {
    config: ClientConfig,
    dispatcher: Option<Arc<dyn Dispatcher>>,
    cache: Arc<ValidatorCache>,
}

impl ApiFactory {
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            dispatcher: None,
            cache: schema::shared(),
        }
    }

    /// Substitutes the transport, e.g. a recording stub in tests or an
    /// IPC bridge in an embedded setting.
    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn Dispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Uses a dedicated validator cache instead of the process-wide one.
    #[must_use]
    pub fn with_validator_cache(mut self, cache: Arc<ValidatorCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Builds methods and hooks from already-typed definitions.
    ///
    /// Definitions without a usable `id` are skipped with a warning.
    /// When two definitions share an `id`, the later one wins, matching
    /// plain map assignment in the generated artifacts.
    ///
    /// # Errors
    /// Fails on an unclassifiable HTTP method, a schema that does not
    /// compile, or a dispatcher that cannot be constructed.
    pub fn build(self, definitions: Vec<EndpointDefinition>) -> Result<Api, Error> {
        let dispatcher: Arc<dyn Dispatcher> = match self.dispatcher {
            Some(dispatcher) => dispatcher,
            None => Arc::new(HttpDispatcher::new(&self.config)?),
        };

        let mut methods: IndexMap<String, Arc<ApiMethod>> = IndexMap::new();
        let mut hooks: IndexMap<String, CallHook> = IndexMap::new();

        for definition in definitions {
            if !definition.has_valid_id() {
                warn!(
                    target: "apiloom::factory",
                    "skipping definition without a usable id ({} {})",
                    definition.method,
                    definition.path
                );
                continue;
            }

            let id = definition.id.clone();
            let method = Arc::new(ApiMethod::build(
                definition,
                self.config.clone(),
                Arc::clone(&dispatcher),
                &self.cache,
            )?);

            hooks.insert(hook_name(&id), CallHook::new(Arc::clone(&method)));
            if methods.insert(id.clone(), method).is_some() {
                debug!(
                    target: "apiloom::factory",
                    "definition '{}' redefined, later entry wins",
                    id
                );
            }
        }

        Ok(Api { methods, hooks })
    }

    /// Builds from a raw JSON artifact, the form the definition
    /// generator emits.
    ///
    /// Entries that do not deserialize into a definition are skipped
    /// with a warning, like entries without an id.
    ///
    /// # Errors
    /// Rejects non-array input as a configuration error; otherwise as
    /// [`build`](Self::build).
    pub fn build_from_json(self, definitions: &Value) -> Result<Api, Error> {
        let Value::Array(entries) = definitions else {
            return Err(Error::config("endpoint definitions must be an array"));
        };
        let typed = entries
            .iter()
            .filter_map(|entry| match serde_json::from_value(entry.clone()) {
                Ok(definition) => Some(definition),
                Err(err) => {
                    warn!(
                        target: "apiloom::factory",
                        "skipping malformed definition entry: {}",
                        err
                    );
                    None
                }
            })
            .collect();
        self.build(typed)
    }
}

/// The factory's product: one callable method per definition `id` and
/// one hook per `use<Id>` key.
#[derive(Debug)]
pub struct Api {
    methods: IndexMap<String, Arc<ApiMethod>>,
    hooks: IndexMap<String, CallHook>,
}

impl Api {
    /// Looks up a method by definition id.
    #[must_use]
    pub fn method(&self, id: &str) -> Option<&Arc<ApiMethod>> {
        self.methods.get(id)
    }

    /// Looks up a hook by its `use<Id>` key.
    #[must_use]
    pub fn hook(&self, name: &str) -> Option<&CallHook> {
        self.hooks.get(name)
    }

    /// Method ids in definition order.
    pub fn method_ids(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    /// Hook keys in definition order.
    pub fn hook_names(&self) -> impl Iterator<Item = &str> {
        self.hooks.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Convenience invocation by id.
    ///
    /// # Errors
    /// An unknown id is a configuration error; otherwise as
    /// [`ApiMethod::call`].
    pub async fn call(
        &self,
        id: &str,
        params: &Map<String, Value>,
        body: RequestBody,
    ) -> Result<CallResult, Error> {
        let method = self
            .methods
            .get(id)
            .ok_or_else(|| Error::config(format!("unknown endpoint '{id}'")))?;
        method.call(params, body).await
    }
}

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::weighted::{RandomSource, ThreadRandom};
use crate::{
    BoxError, CompileError, FunctionConfig, ResultBinding, ResultFunction, SchemaBinding,
    SchemaFunction,
};

type SchemaFactory<T, C> =
    Arc<dyn Fn(&JsonValue) -> Result<Arc<dyn SchemaFunction<T, C>>, BoxError> + Send + Sync>;
type ResultFactory<T, C> =
    Arc<dyn Fn(&JsonValue) -> Result<Arc<dyn ResultFunction<T, C>>, BoxError> + Send + Sync>;

/// Named factories that turn a function's JSON arguments into a ready-to-run
/// schema or result function.
///
/// Arguments are validated once, at compile time; the functions a factory
/// returns capture whatever typed configuration they need.
///
/// # Example
///
/// ```
/// use rulestage::{schema_fn, result_fn, FunctionRegistry, RuleResult};
///
/// let registry: FunctionRegistry<String, ()> = FunctionRegistry::new()
///     .schema("length", |_args| {
///         Ok(schema_fn(|value: &String, _: &()| Some(value.len().to_string())))
///     })
///     .result("shout", |_args| {
///         Ok(result_fn(|value: String, _| Ok(RuleResult::updated(value.to_uppercase()))))
///     });
/// assert!(registry.has_schema("length"));
/// ```
pub struct FunctionRegistry<T, C> {
    schema: HashMap<String, SchemaFactory<T, C>>,
    results: HashMap<String, ResultFactory<T, C>>,
    random: Arc<dyn RandomSource>,
}

impl<T: 'static, C: 'static> FunctionRegistry<T, C> {
    /// An empty registry drawing randomness from [`ThreadRandom`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_random(Arc::new(ThreadRandom))
    }

    /// An empty registry using `random` for weighted selection and for the
    /// built-in `percent` function.
    #[must_use]
    pub fn with_random(random: Arc<dyn RandomSource>) -> Self {
        Self {
            schema: HashMap::new(),
            results: HashMap::new(),
            random,
        }
    }

    /// Register the generic built-in functions (`percent`, `logAtag`).
    #[must_use]
    pub fn with_builtins(self) -> Self {
        crate::builtin::register(self)
    }

    /// Register a schema function factory under `name`, replacing any
    /// previous registration.
    #[must_use]
    pub fn schema<F>(mut self, name: &str, factory: F) -> Self
    where
        F: Fn(&JsonValue) -> Result<Arc<dyn SchemaFunction<T, C>>, BoxError>
            + Send
            + Sync
            + 'static,
    {
        self.schema.insert(name.to_owned(), Arc::new(factory));
        self
    }

    /// Register a result function factory under `name`, replacing any
    /// previous registration.
    #[must_use]
    pub fn result<F>(mut self, name: &str, factory: F) -> Self
    where
        F: Fn(&JsonValue) -> Result<Arc<dyn ResultFunction<T, C>>, BoxError>
            + Send
            + Sync
            + 'static,
    {
        self.results.insert(name.to_owned(), Arc::new(factory));
        self
    }

    #[must_use]
    pub fn random(&self) -> &Arc<dyn RandomSource> {
        &self.random
    }

    #[must_use]
    pub fn has_schema(&self, name: &str) -> bool {
        self.schema.contains_key(name)
    }

    #[must_use]
    pub fn has_result(&self, name: &str) -> bool {
        self.results.contains_key(name)
    }

    pub(crate) fn schema_binding(
        &self,
        config: &FunctionConfig,
    ) -> Result<SchemaBinding<T, C>, CompileError> {
        let factory = self.schema.get(&config.function).ok_or_else(|| {
            CompileError::UnknownSchemaFunction {
                function: config.function.clone(),
            }
        })?;
        let function = factory(&config.args).map_err(|source| CompileError::InvalidArgs {
            function: config.function.clone(),
            source,
        })?;
        Ok(SchemaBinding::new(config.function.clone(), function))
    }

    pub(crate) fn result_binding(
        &self,
        config: &FunctionConfig,
    ) -> Result<ResultBinding<T, C>, CompileError> {
        let factory = self.results.get(&config.function).ok_or_else(|| {
            CompileError::UnknownResultFunction {
                function: config.function.clone(),
            }
        })?;
        let function = factory(&config.args).map_err(|source| CompileError::InvalidArgs {
            function: config.function.clone(),
            source,
        })?;
        Ok(ResultBinding::new(config.function.clone(), function))
    }
}

impl<T: 'static, C: 'static> Default for FunctionRegistry<T, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C> fmt::Debug for FunctionRegistry<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut schema: Vec<&str> = self.schema.keys().map(String::as_str).collect();
        let mut results: Vec<&str> = self.results.keys().map(String::as_str).collect();
        schema.sort_unstable();
        results.sort_unstable();
        f.debug_struct("FunctionRegistry")
            .field("schema", &schema)
            .field("results", &results)
            .finish_non_exhaustive()
    }
}

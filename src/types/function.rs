use std::fmt;
use std::sync::Arc;

use super::infra::InfrastructureArgs;
use super::result::RuleResult;

/// Error type result functions and function factories may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// What a result function hands back for one action.
pub type ActionResult<T> = Result<RuleResult<T>, BoxError>;

/// Extracts one matcher string from a value for one tree dimension.
///
/// Per-binding configuration is captured when the function is built, so
/// `extract` only sees the value and the caller's context. `None` and the
/// empty string both mean "absent".
pub trait SchemaFunction<T, C>: Send + Sync {
    fn extract(&self, value: &T, context: &C) -> Option<String>;
}

impl<T, C, F> SchemaFunction<T, C> for F
where
    F: Fn(&T, &C) -> Option<String> + Send + Sync,
{
    fn extract(&self, value: &T, context: &C) -> Option<String> {
        self(value, context)
    }
}

/// Applies one action to a value, producing a partial [`RuleResult`].
pub trait ResultFunction<T, C>: Send + Sync {
    /// # Errors
    ///
    /// Any error is propagated to the caller of the rule untouched.
    fn apply(&self, value: T, args: &InfrastructureArgs<'_, C>) -> ActionResult<T>;
}

impl<T, C, F> ResultFunction<T, C> for F
where
    F: Fn(T, &InfrastructureArgs<'_, C>) -> ActionResult<T> + Send + Sync,
{
    fn apply(&self, value: T, args: &InfrastructureArgs<'_, C>) -> ActionResult<T> {
        self(value, args)
    }
}

/// Wrap a closure as a shareable schema function.
pub fn schema_fn<T, C, F>(f: F) -> Arc<dyn SchemaFunction<T, C>>
where
    F: Fn(&T, &C) -> Option<String> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wrap a closure as a shareable result function.
pub fn result_fn<T, C, F>(f: F) -> Arc<dyn ResultFunction<T, C>>
where
    F: Fn(T, &InfrastructureArgs<'_, C>) -> ActionResult<T> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A named schema function, one per tree dimension.
pub struct SchemaBinding<T, C> {
    name: String,
    function: Arc<dyn SchemaFunction<T, C>>,
}

impl<T, C> SchemaBinding<T, C> {
    pub fn new(name: impl Into<String>, function: Arc<dyn SchemaFunction<T, C>>) -> Self {
        Self {
            name: name.into(),
            function,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn extract(&self, value: &T, context: &C) -> Option<String> {
        self.function.extract(value, context)
    }
}

impl<T, C> Clone for SchemaBinding<T, C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            function: Arc::clone(&self.function),
        }
    }
}

impl<T, C> fmt::Debug for SchemaBinding<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaBinding")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A named result function, one per action in a rule's action list.
pub struct ResultBinding<T, C> {
    name: String,
    function: Arc<dyn ResultFunction<T, C>>,
}

impl<T, C> ResultBinding<T, C> {
    pub fn new(name: impl Into<String>, function: Arc<dyn ResultFunction<T, C>>) -> Self {
        Self {
            name: name.into(),
            function,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn apply(&self, value: T, args: &InfrastructureArgs<'_, C>) -> ActionResult<T> {
        self.function.apply(value, args)
    }
}

impl<T, C> Clone for ResultBinding<T, C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            function: Arc::clone(&self.function),
        }
    }
}

impl<T, C> fmt::Debug for ResultBinding<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultBinding")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

use std::collections::HashMap;
use std::fmt;

use super::{apply_actions, Rule};
use crate::{EvaluationError, InfrastructureArgs, ResultBinding, RuleResult};

/// Condition label reported by [`DefaultActionRule`].
pub const DEFAULT_CONDITION: &str = "default";

/// Runs a fixed action list on every value, with no tree lookup.
pub struct DefaultActionRule<T, C> {
    actions: Vec<ResultBinding<T, C>>,
    analytics_key: String,
    model_version: String,
}

impl<T, C> DefaultActionRule<T, C> {
    pub fn new(
        actions: Vec<ResultBinding<T, C>>,
        analytics_key: impl Into<String>,
        model_version: impl Into<String>,
    ) -> Self {
        Self {
            actions,
            analytics_key: analytics_key.into(),
            model_version: model_version.into(),
        }
    }

    #[must_use]
    pub fn actions(&self) -> &[ResultBinding<T, C>] {
        &self.actions
    }
}

impl<T, C> Rule<T, C> for DefaultActionRule<T, C> {
    fn process(&self, value: T, context: &C) -> Result<RuleResult<T>, EvaluationError> {
        let args = InfrastructureArgs::new(
            context,
            HashMap::new(),
            HashMap::new(),
            DEFAULT_CONDITION,
            &self.analytics_key,
            &self.model_version,
        );
        apply_actions(value, &self.actions, &args)
    }
}

impl<T, C> fmt::Debug for DefaultActionRule<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultActionRule")
            .field("actions", &self.actions)
            .field("analytics_key", &self.analytics_key)
            .field("model_version", &self.model_version)
            .finish()
    }
}

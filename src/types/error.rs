use thiserror::Error;

use super::function::BoxError;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("unknown schema function '{function}'")]
    UnknownSchemaFunction { function: String },

    #[error("unknown result function '{function}'")]
    UnknownResultFunction { function: String },

    #[error("invalid arguments for function '{function}': {source}")]
    InvalidArgs {
        function: String,
        #[source]
        source: BoxError,
    },

    #[error("condition '{condition}' has {found} dimensions but the schema has {expected}")]
    ConditionArity {
        condition: String,
        expected: usize,
        found: usize,
    },

    #[error("duplicate condition '{condition}'")]
    DuplicateCondition { condition: String },

    #[error("weight of entry {index} must be greater than zero")]
    ZeroWeight { index: usize },

    #[error("total weight exceeds {}", u32::MAX)]
    WeightOverflow,

    #[error("weighted list has no entries")]
    EmptyWeightedList,

    #[error("rule set '{name}' has no model groups")]
    EmptyRuleSet { name: String },
}

/// Raised while evaluating a rule when an action fails.
#[derive(Debug, Error)]
#[error("action '{action}' failed: {source}")]
pub struct EvaluationError {
    action: String,
    #[source]
    source: BoxError,
}

impl EvaluationError {
    pub(crate) fn new(action: impl Into<String>, source: BoxError) -> Self {
        Self {
            action: action.into(),
            source,
        }
    }

    /// Name of the result function that failed.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }
}

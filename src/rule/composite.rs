use std::sync::Arc;

use super::Rule;
use crate::{EvaluationError, RuleResult};

/// Runs several independently authored rules against the same input value and
/// merges their results in order, stopping at the first reject.
///
/// Sub-rules do not see each other's output; the merged value is the last
/// sub-rule's value.
pub struct CompositeRule<T, C> {
    rules: Vec<Arc<dyn Rule<T, C>>>,
}

impl<T, C> CompositeRule<T, C> {
    #[must_use]
    pub fn new(rules: Vec<Arc<dyn Rule<T, C>>>) -> Self {
        Self { rules }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<T: Clone, C> Rule<T, C> for CompositeRule<T, C> {
    fn process(&self, value: T, context: &C) -> Result<RuleResult<T>, EvaluationError> {
        let mut merged: Option<RuleResult<T>> = None;
        for rule in &self.rules {
            let partial = rule.process(value.clone(), context)?;
            let next = match merged {
                Some(acc) => acc.merge(partial),
                None => partial,
            };
            if next.is_reject() {
                return Ok(next);
            }
            merged = Some(next);
        }
        Ok(merged.unwrap_or_else(|| RuleResult::unaltered(value)))
    }
}

impl<T, C> std::fmt::Debug for CompositeRule<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeRule")
            .field("rules", &self.rules.len())
            .finish()
    }
}

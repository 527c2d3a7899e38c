use super::Rule;
use crate::{EvaluationError, RuleResult};

/// Passes every value through unaltered.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpRule;

impl<T, C> Rule<T, C> for NoOpRule {
    fn process(&self, value: T, _context: &C) -> Result<RuleResult<T>, EvaluationError> {
        Ok(RuleResult::unaltered(value))
    }
}

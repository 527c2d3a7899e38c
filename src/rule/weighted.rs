use std::sync::Arc;

use super::Rule;
use crate::weighted::{RandomSource, WeightedList};
use crate::{EvaluationError, RuleResult};

/// Picks one sub-rule per evaluation in proportion to its weight and
/// delegates to it.
pub struct RandomWeightedRule<T, C> {
    rules: WeightedList<Arc<dyn Rule<T, C>>>,
    random: Arc<dyn RandomSource>,
}

impl<T, C> RandomWeightedRule<T, C> {
    #[must_use]
    pub fn new(rules: WeightedList<Arc<dyn Rule<T, C>>>, random: Arc<dyn RandomSource>) -> Self {
        Self { rules, random }
    }

    #[must_use]
    pub fn total_weight(&self) -> u32 {
        self.rules.total_weight()
    }
}

impl<T, C> Rule<T, C> for RandomWeightedRule<T, C> {
    fn process(&self, value: T, context: &C) -> Result<RuleResult<T>, EvaluationError> {
        match self.rules.pick(self.random.as_ref()) {
            Some(rule) => rule.process(value, context),
            None => {
                tracing::warn!(
                    total_weight = self.rules.total_weight(),
                    "random source drew a seed outside the weighted range"
                );
                Ok(RuleResult::unaltered(value))
            }
        }
    }
}

impl<T, C> std::fmt::Debug for RandomWeightedRule<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomWeightedRule")
            .field("rules", &self.rules.len())
            .field("total_weight", &self.rules.total_weight())
            .finish_non_exhaustive()
    }
}

mod composite;
mod conditional;
mod default;
mod noop;
mod weighted;

pub use composite::CompositeRule;
pub use conditional::{ConditionalRule, ConditionalRuleBuilder, RuleConfig, CONDITION_SEPARATOR};
pub use default::{DefaultActionRule, DEFAULT_CONDITION};
pub use noop::NoOpRule;
pub use weighted::RandomWeightedRule;

use crate::{EvaluationError, InfrastructureArgs, ResultBinding, RuleResult};

/// A compiled rule: turns a value and the caller's context into a result.
///
/// Every rule variant implements this one method; rules nest by holding
/// `Arc<dyn Rule<T, C>>` children.
pub trait Rule<T, C>: Send + Sync {
    /// # Errors
    ///
    /// Returns [`EvaluationError`] if a result function fails. The engine does
    /// not recover partial results.
    fn process(&self, value: T, context: &C) -> Result<RuleResult<T>, EvaluationError>;
}

/// Fold `actions` over `value` in order, merging each partial result into the
/// running one and stopping at the first reject.
pub(crate) fn apply_actions<T, C>(
    value: T,
    actions: &[ResultBinding<T, C>],
    args: &InfrastructureArgs<'_, C>,
) -> Result<RuleResult<T>, EvaluationError> {
    let mut result = RuleResult::unaltered(value);
    for action in actions {
        let Some(current) = result.take_value() else {
            break;
        };
        tracing::trace!(action = action.name(), condition = args.condition(), "applying action");
        let partial = action
            .apply(current, args)
            .map_err(|source| EvaluationError::new(action.name(), source))?;
        result = result.merge(partial);
        if result.is_reject() {
            tracing::trace!(action = action.name(), "action rejected value; stopping");
            break;
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::{result_fn, AnalyticsTag, RuleAction};

    fn args(ctx: &()) -> InfrastructureArgs<'_, ()> {
        InfrastructureArgs::new(ctx, HashMap::new(), HashMap::new(), "c", "key", "v1")
    }

    #[test]
    fn empty_action_list_is_unaltered() {
        let result = apply_actions::<i64, ()>(3, &[], &args(&())).unwrap();
        assert_eq!(result, RuleResult::unaltered(3));
    }

    #[test]
    fn actions_see_previous_output() {
        let actions: Vec<ResultBinding<i64, ()>> = vec![
            ResultBinding::new("add", result_fn(|v: i64, _| Ok(RuleResult::updated(v + 1)))),
            ResultBinding::new("mul", result_fn(|v: i64, _| Ok(RuleResult::updated(v * 10)))),
        ];
        let result = apply_actions(1, &actions, &args(&())).unwrap();
        assert_eq!(result.action(), RuleAction::Update);
        assert_eq!(result.into_value(), Some(20));
    }

    #[test]
    fn reject_stops_the_fold() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let actions: Vec<ResultBinding<i64, ()>> = vec![
            ResultBinding::new(
                "reject",
                result_fn(|_: i64, _| {
                    Ok(RuleResult::rejected().with_tags([AnalyticsTag::new("rejected")]))
                }),
            ),
            ResultBinding::new(
                "never",
                result_fn(move |v: i64, _| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(RuleResult::updated(v))
                }),
            ),
        ];
        let result = apply_actions(1, &actions, &args(&())).unwrap();
        assert!(result.is_reject());
        assert_eq!(result.analytics_tags().len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn action_error_carries_name() {
        let actions: Vec<ResultBinding<i64, ()>> = vec![ResultBinding::new(
            "broken",
            result_fn(|_: i64, _| Err("boom".into())),
        )];
        let err = apply_actions(1, &actions, &args(&())).unwrap_err();
        assert_eq!(err.action(), "broken");
        assert_eq!(err.to_string(), "action 'broken' failed: boom");
    }
}

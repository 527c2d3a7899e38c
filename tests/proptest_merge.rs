
use std::sync::atomic::{AtomicU32, Ordering};

use proptest::prelude::*;
use rulestage::{
    result_fn, schema_fn, ConditionalRule, RandomSource, ResultBinding, Rule, RuleAction,
    RuleResult, SchemaBinding, WeightedList,
};
use strategies::{arb_action, arb_result, arb_weights};

/// Walks `0, 1, 2, ...` so every seed in range is drawn exactly once.
struct Sweep(AtomicU32);

impl RandomSource for Sweep {
    fn next_below(&self, bound: u32) -> u32 {
        self.0.fetch_add(1, Ordering::SeqCst) % bound
    }
}

fn replay(results: &[RuleResult<i64>]) -> ConditionalRule<i64, ()> {
    let actions = results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            let result = result.clone();
            ResultBinding::new(format!("step{i}"), result_fn(move |_: i64, _| Ok(result.clone())))
        })
        .collect();
    ConditionalRule::builder("replay", "1")
        .schema(SchemaBinding::new("any", schema_fn(|_: &i64, _: &()| None)))
        .when(&["*"], actions)
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Merging never lowers the action.
    #[test]
    fn merge_action_is_max(a in arb_action(), b in arb_action()) {
        prop_assert_eq!(a.merge(b), a.max(b));
        prop_assert!(a.merge(b) >= a && a.merge(b) >= b);
        prop_assert_eq!(a.merge(RuleAction::NoAction), a);
        prop_assert_eq!(a.merge(RuleAction::Reject), RuleAction::Reject);
    }

    #[test]
    fn merge_is_associative(a in arb_result(), b in arb_result(), c in arb_result()) {
        let left = a.clone().merge(b.clone()).merge(c.clone());
        let right = a.merge(b.merge(c));
        prop_assert_eq!(left, right);
    }

    #[test]
    fn merge_concatenates_in_order(a in arb_result(), b in arb_result()) {
        let merged = a.clone().merge(b.clone());

        let mut tags = a.analytics_tags().to_vec();
        tags.extend_from_slice(b.analytics_tags());
        prop_assert_eq!(merged.analytics_tags(), tags.as_slice());

        let mut seats = a.rejected_seats().to_vec();
        seats.extend_from_slice(b.rejected_seats());
        prop_assert_eq!(merged.rejected_seats(), seats.as_slice());
    }

    // A reject is absorbing: the value is gone and stays gone.
    #[test]
    fn reject_has_no_value(a in arb_result(), b in arb_result()) {
        let merged = a.merge(b);
        prop_assert_eq!(merged.is_reject(), merged.value().is_none());
    }

    // The fold stops at the first reject, and everything before it is kept.
    #[test]
    fn fold_stops_at_first_reject(results in prop::collection::vec(arb_result(), 0..6)) {
        let rule = replay(&results);
        let outcome = rule.process(0, &()).unwrap();

        let cut = results.iter().position(RuleResult::is_reject).map_or(results.len(), |i| i + 1);
        let expected = results[..cut]
            .iter()
            .cloned()
            .fold(RuleResult::unaltered(0), RuleResult::merge);
        prop_assert_eq!(outcome, expected);
    }

    // Sweeping every seed once picks each entry exactly `weight` times.
    #[test]
    fn weighted_pick_matches_weights(weights in arb_weights()) {
        let list = WeightedList::new(weights.iter().copied().enumerate()).unwrap();
        let sweep = Sweep(AtomicU32::new(0));

        let mut counts = vec![0_u32; weights.len()];
        for _ in 0..list.total_weight() {
            let picked = list.pick(&sweep).unwrap();
            counts[*picked] += 1;
        }
        prop_assert_eq!(counts, weights);
    }
}

#[test]
fn weighted_one_to_three_split() {
    let list = WeightedList::new([("A", 1), ("B", 3)]).unwrap();
    let picks: Vec<&str> = (0..4).map(|seed| *list.get(seed).unwrap()).collect();
    assert_eq!(picks, ["A", "B", "B", "B"]);
    assert!(list.get(4).is_none());

    let sweep = Sweep(AtomicU32::new(0));
    let a = (0..400).filter(|_| *list.pick(&sweep).unwrap() == "A").count();
    assert_eq!(a, 100);
}

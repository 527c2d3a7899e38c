use std::sync::Arc;

use crate::rule::{CompositeRule, ConditionalRule, NoOpRule, RandomWeightedRule, Rule};
use crate::weighted::WeightedList;
use crate::{
    CompileError, FunctionConfig, FunctionRegistry, ModelGroupConfig, ResultBinding,
    RuleSetConfig, StageConfig,
};

pub(crate) fn compile_stage<T, C>(
    config: &StageConfig,
    registry: &FunctionRegistry<T, C>,
) -> Result<Arc<dyn Rule<T, C>>, CompileError>
where
    T: Clone + 'static,
    C: 'static,
{
    if !config.enabled {
        tracing::debug!("stage disabled; compiling to a pass-through rule");
        return Ok(Arc::new(NoOpRule));
    }

    let mut rule_sets = config
        .rule_sets
        .iter()
        .filter(|rule_set| rule_set.enabled)
        .map(|rule_set| compile_rule_set(rule_set, registry))
        .collect::<Result<Vec<_>, _>>()?;

    let rule: Arc<dyn Rule<T, C>> = match rule_sets.len() {
        0 => Arc::new(NoOpRule),
        1 => rule_sets.remove(0),
        _ => Arc::new(CompositeRule::new(rule_sets)),
    };
    Ok(rule)
}

fn compile_rule_set<T, C>(
    config: &RuleSetConfig,
    registry: &FunctionRegistry<T, C>,
) -> Result<Arc<dyn Rule<T, C>>, CompileError>
where
    T: 'static,
    C: 'static,
{
    if config.model_groups.is_empty() {
        return Err(CompileError::EmptyRuleSet {
            name: config.name.clone(),
        });
    }

    let mut groups = Vec::with_capacity(config.model_groups.len());
    for group in &config.model_groups {
        let rule: Arc<dyn Rule<T, C>> = Arc::new(compile_model_group(group, registry)?);
        groups.push((rule, group.weight));
    }

    if groups.len() == 1 {
        if groups[0].1 == 0 {
            return Err(CompileError::ZeroWeight { index: 0 });
        }
        return Ok(groups.remove(0).0);
    }

    let weighted = WeightedList::new(groups)?;
    tracing::debug!(
        rule_set = %config.name,
        groups = weighted.len(),
        total_weight = weighted.total_weight(),
        "compiled weighted rule set"
    );
    Ok(Arc::new(RandomWeightedRule::new(
        weighted,
        Arc::clone(registry.random()),
    )))
}

pub(crate) fn compile_model_group<T, C>(
    config: &ModelGroupConfig,
    registry: &FunctionRegistry<T, C>,
) -> Result<ConditionalRule<T, C>, CompileError>
where
    T: 'static,
    C: 'static,
{
    let mut builder = ConditionalRule::builder(&config.analytics_key, &config.version);

    for function in &config.schema {
        builder = builder.schema(registry.schema_binding(function)?);
    }
    for entry in &config.rules {
        let actions = result_bindings(&entry.results, registry)?;
        builder = builder.when(entry.conditions.as_slice(), actions);
    }
    builder = builder.default_actions(result_bindings(&config.default, registry)?);

    let rule = builder.build()?;
    tracing::debug!(
        analytics_key = %config.analytics_key,
        version = %config.version,
        dimensions = config.schema.len(),
        conditions = rule.tree().len(),
        has_default = rule.has_default(),
        "compiled model group"
    );
    Ok(rule)
}

fn result_bindings<T, C>(
    functions: &[FunctionConfig],
    registry: &FunctionRegistry<T, C>,
) -> Result<Vec<ResultBinding<T, C>>, CompileError>
where
    T: 'static,
    C: 'static,
{
    functions
        .iter()
        .map(|function| registry.result_binding(function))
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{
        result_fn, schema_fn, AnalyticsTag, CompileError, FunctionConfig, FunctionRegistry,
        ModelGroupConfig, Rule, RuleAction, RuleEntry, RuleResult, RuleSetConfig, StageConfig,
    };

    type Value = Vec<&'static str>;

    fn registry() -> FunctionRegistry<Value, &'static str> {
        FunctionRegistry::new()
            .schema("ctx", |_| {
                Ok(schema_fn(|_: &Value, ctx: &&'static str| Some((*ctx).to_owned())))
            })
            .result("append", |args| {
                let item: &'static str = match args.get("item").and_then(|v| v.as_str()) {
                    Some("a") => "a",
                    Some("b") => "b",
                    Some("c") => "c",
                    _ => return Err("item must be one of a, b, c".into()),
                };
                Ok(result_fn(move |mut v: Value, _| {
                    v.push(item);
                    Ok(RuleResult::updated(v).with_tags([AnalyticsTag::new(item)]))
                }))
            })
            .result("reject", |_| Ok(result_fn(|_: Value, _| Ok(RuleResult::rejected()))))
    }

    fn append(item: &str) -> FunctionConfig {
        FunctionConfig::new("append").with_args(json!({ "item": item }))
    }

    fn group(conditions: &[&str], results: Vec<FunctionConfig>) -> ModelGroupConfig {
        ModelGroupConfig {
            analytics_key: "test".into(),
            version: "1".into(),
            schema: vec![FunctionConfig::new("ctx")],
            rules: vec![RuleEntry {
                conditions: conditions.iter().map(|c| (*c).to_owned()).collect(),
                results,
            }],
            ..Default::default()
        }
    }

    fn rule_set(name: &str, groups: Vec<ModelGroupConfig>) -> RuleSetConfig {
        RuleSetConfig {
            name: name.into(),
            enabled: true,
            model_groups: groups,
        }
    }

    fn stage(rule_sets: Vec<RuleSetConfig>) -> StageConfig {
        StageConfig {
            rule_sets,
            ..Default::default()
        }
    }

    #[test]
    fn disabled_stage_passes_through() {
        let config = StageConfig {
            enabled: false,
            ..stage(vec![rule_set("s", vec![group(&["*"], vec![append("a")])])])
        };
        let snapshot = config.compile(&registry()).unwrap();
        let result = snapshot.process(vec![], &"x").unwrap();
        assert_eq!(result, RuleResult::unaltered(vec![]));
    }

    #[test]
    fn disabled_rule_sets_are_skipped() {
        let mut skipped = rule_set("off", vec![group(&["*"], vec![append("a")])]);
        skipped.enabled = false;
        let config = stage(vec![
            skipped,
            rule_set("on", vec![group(&["*"], vec![append("b")])]),
        ]);
        let result = config.compile(&registry()).unwrap().process(vec![], &"x").unwrap();
        assert_eq!(result.into_value(), Some(vec!["b"]));
    }

    #[test]
    fn rule_sets_compose_in_order() {
        let config = stage(vec![
            rule_set("first", vec![group(&["*"], vec![append("a")])]),
            rule_set("second", vec![group(&["*"], vec![append("b")])]),
        ]);
        let result = config.compile(&registry()).unwrap().process(vec![], &"x").unwrap();

        assert_eq!(result.action(), RuleAction::Update);
        let tags: Vec<&str> = result
            .analytics_tags()
            .iter()
            .map(|t| t.activity.as_str())
            .collect();
        assert_eq!(tags, ["a", "b"]);
        // Rule sets share the input; the merged value is the last rule set's.
        assert_eq!(result.into_value(), Some(vec!["b"]));
    }

    #[test]
    fn reject_in_first_rule_set_short_circuits() {
        let config = stage(vec![
            rule_set("gate", vec![group(&["blocked"], vec![FunctionConfig::new("reject")])]),
            rule_set("later", vec![group(&["*"], vec![append("c")])]),
        ]);
        let snapshot = config.compile(&registry()).unwrap();

        let blocked = snapshot.process(vec![], &"blocked").unwrap();
        assert!(blocked.is_reject());
        assert!(blocked.analytics_tags().is_empty());

        let allowed = snapshot.process(vec![], &"open").unwrap();
        assert_eq!(allowed.into_value(), Some(vec!["c"]));
    }

    #[test]
    fn empty_rule_set_fails() {
        let config = stage(vec![rule_set("empty", vec![])]);
        assert!(matches!(
            config.compile(&registry()),
            Err(CompileError::EmptyRuleSet { name }) if name == "empty"
        ));
    }

    #[test]
    fn zero_weight_fails() {
        let mut single = group(&["*"], vec![append("a")]);
        single.weight = 0;
        let config = stage(vec![rule_set("s", vec![single])]);
        assert!(matches!(
            config.compile(&registry()),
            Err(CompileError::ZeroWeight { index: 0 })
        ));

        let mut second = group(&["*"], vec![append("b")]);
        second.weight = 0;
        let config = stage(vec![rule_set(
            "s",
            vec![group(&["*"], vec![append("a")]), second],
        )]);
        assert!(matches!(
            config.compile(&registry()),
            Err(CompileError::ZeroWeight { index: 1 })
        ));
    }

    #[test]
    fn unknown_function_fails() {
        let config = stage(vec![rule_set(
            "s",
            vec![group(&["*"], vec![FunctionConfig::new("missing")])],
        )]);
        assert!(matches!(
            config.compile(&registry()),
            Err(CompileError::UnknownResultFunction { function }) if function == "missing"
        ));
    }

    #[test]
    fn invalid_args_fail() {
        let config = stage(vec![rule_set("s", vec![group(&["*"], vec![append("z")])])]);
        assert!(matches!(
            config.compile(&registry()),
            Err(CompileError::InvalidArgs { function, .. }) if function == "append"
        ));
    }

    #[test]
    fn condition_arity_fails() {
        let config = stage(vec![rule_set("s", vec![group(&["a", "b"], vec![append("a")])])]);
        assert!(matches!(
            config.compile(&registry()),
            Err(CompileError::ConditionArity { expected: 1, found: 2, .. })
        ));
    }

    #[test]
    fn default_runs_on_miss() {
        let mut with_default = group(&["hit"], vec![append("a")]);
        with_default.default = vec![append("c")];
        let rule = with_default.compile(&registry()).unwrap();

        let result = rule.process(vec![], &"miss").unwrap();
        assert_eq!(result.into_value(), Some(vec!["c"]));
        let result = rule.process(vec![], &"hit").unwrap();
        assert_eq!(result.into_value(), Some(vec!["a"]));
    }

    #[test]
    fn timestamp_carries_into_snapshot() {
        let mut config = stage(vec![]);
        let ts: chrono::DateTime<chrono::Utc> = "2024-01-02T03:04:05Z".parse().unwrap();
        config.timestamp = Some(ts);
        let snapshot = config.compile(&registry()).unwrap();
        assert_eq!(snapshot.timestamp(), ts);
    }
}

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rulestage::{
    result_fn, schema_fn, FunctionConfig, FunctionRegistry, ModelGroupConfig, Rule, RuleEntry,
    RuleResult,
};
use serde_json::json;

/// A request classified along `depth` dimensions, one string per dimension.
type Request = Vec<String>;

fn registry(depth: usize) -> FunctionRegistry<u64, Request> {
    let mut registry = FunctionRegistry::new().result("raise", |args| {
        let by = args.as_u64().ok_or("raise takes a number")?;
        Ok(result_fn(move |bid: u64, _| Ok(RuleResult::updated(bid + by))))
    });
    for i in 0..depth {
        registry = registry.schema(&format!("d{i}"), move |_| {
            Ok(schema_fn(move |_: &u64, req: &Request| req.get(i).cloned()))
        });
    }
    registry
}

/// `width` exact values per dimension along the diagonal, plus an all-wildcard
/// fallback path.
fn model_group(depth: usize, width: usize) -> ModelGroupConfig {
    let mut rules: Vec<RuleEntry> = (0..width)
        .map(|w| RuleEntry {
            conditions: (0..depth).map(|d| format!("v{d}_{w}")).collect(),
            results: vec![FunctionConfig::new("raise").with_args(json!(1))],
        })
        .collect();
    rules.push(RuleEntry {
        conditions: vec!["*".to_owned(); depth],
        results: vec![FunctionConfig::new("raise").with_args(json!(2))],
    });
    ModelGroupConfig {
        analytics_key: "bench".into(),
        version: "1".into(),
        schema: (0..depth).map(|i| FunctionConfig::new(format!("d{i}"))).collect(),
        rules,
        ..Default::default()
    }
}

fn request(depth: usize, w: usize) -> Request {
    (0..depth).map(|d| format!("v{d}_{w}")).collect()
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_eval");

    for &depth in &[1, 3, 6] {
        let registry = registry(depth);
        let rule = model_group(depth, 50).compile(&registry).unwrap();
        let exact = request(depth, 25);
        let miss = request(depth, 999);

        group.bench_function(&format!("{depth}_dims_exact"), |b| {
            b.iter(|| rule.process(black_box(100), black_box(&exact)));
        });
        group.bench_function(&format!("{depth}_dims_wildcard"), |b| {
            b.iter(|| rule.process(black_box(100), black_box(&miss)));
        });
    }

    group.finish();
}

fn bench_tree_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_lookup");

    for &width in &[10, 100, 1000] {
        let registry = registry(3);
        let rule = model_group(3, width).compile(&registry).unwrap();
        let matchers = request(3, width / 2);

        group.bench_function(&format!("{width}_paths"), |b| {
            b.iter(|| rule.tree().lookup(black_box(&matchers)).is_some());
        });
    }

    group.finish();
}

fn bench_compilation(c: &mut Criterion) {
    let mut group = c.benchmark_group("compilation");

    for &width in &[10, 100, 1000] {
        let registry = registry(3);
        let config = model_group(3, width);
        group.bench_function(&format!("{width}_paths"), |b| {
            b.iter(|| black_box(config.compile(&registry).unwrap()));
        });
    }

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut input = String::from("analytics \"bench\" version \"1\"\nschema: d0, d1, d2\n");
    for w in 0..100 {
        input.push_str(&format!("when v0_{w} | v1_{w} | *: raise(by = {w})\n"));
    }
    input.push_str("default: raise(by = 0)\n");

    c.bench_function("parse_dsl_100_rules", |b| {
        b.iter(|| ModelGroupConfig::from_dsl(black_box(&input)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_evaluate,
    bench_tree_lookup,
    bench_compilation,
    bench_parse
);
criterion_main!(benches);

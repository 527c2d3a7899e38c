use rulestage::{result_fn, schema_fn, FunctionRegistry, ModelGroupConfig, Rule, RuleResult};
use tracing_subscriber::EnvFilter;

struct Impression {
    media_type: &'static str,
    country: Option<&'static str>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let registry: FunctionRegistry<f64, Impression> = FunctionRegistry::new()
        .with_builtins()
        .schema("mediaType", |_| {
            Ok(schema_fn(|_: &f64, imp: &Impression| Some(imp.media_type.to_owned())))
        })
        .schema("deviceCountry", |args| {
            let fallback = args
                .get("fallback")
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned);
            Ok(schema_fn(move |_: &f64, imp: &Impression| {
                imp.country.map(str::to_owned).or_else(|| fallback.clone())
            }))
        })
        .result("setFloor", |args| {
            let cpm = args
                .get("cpm")
                .and_then(serde_json::Value::as_f64)
                .ok_or("setFloor needs a numeric 'cpm'")?;
            Ok(result_fn(move |floor: f64, _| Ok(RuleResult::updated(floor.max(cpm)))))
        });

    let group = ModelGroupConfig::from_file("demos/floors.rules").expect("failed to load rules");
    let rule = group.compile(&registry).expect("failed to compile rules");

    let impressions = [
        Impression { media_type: "banner", country: None },
        Impression { media_type: "banner", country: Some("DE") },
        Impression { media_type: "video", country: Some("FR") },
        Impression { media_type: "native", country: Some("US") },
    ];

    for imp in &impressions {
        let result = rule.process(0.5, imp).expect("evaluation failed");
        let tags: Vec<String> = result
            .analytics_tags()
            .iter()
            .map(|t| t.values["analyticsValue"].to_string())
            .collect();
        println!(
            "{:<6} {:<4} -> floor {:?}, action {}, tags {tags:?}",
            imp.media_type,
            imp.country.unwrap_or("-"),
            result.value(),
            result.action(),
        );
    }
}

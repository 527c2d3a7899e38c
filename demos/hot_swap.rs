use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::{Duration as Age, Utc};
use rulestage::{
    result_fn, schema_fn, FunctionRegistry, LiveStage, RuleResult, SeededRandom, StageConfig,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let registry: Arc<FunctionRegistry<u64, String>> = Arc::new(
        FunctionRegistry::with_random(Arc::new(SeededRandom::new(7)))
            .with_builtins()
            .schema("channel", |_| {
                Ok(schema_fn(|_: &u64, channel: &String| Some(channel.clone())))
            })
            .result("setFloor", |args| {
                let floor = args.as_u64().ok_or("setFloor takes a number")?;
                Ok(result_fn(move |bid: u64, _| Ok(RuleResult::updated(bid.max(floor)))))
            }),
    );

    let mut config = StageConfig::from_file("demos/stage.json").expect("failed to load stage");
    let stage = Arc::new(LiveStage::new(
        config.compile(registry.as_ref()).expect("failed to compile stage"),
    ));

    let done = Arc::new(AtomicBool::new(false));
    let reader = {
        let stage = Arc::clone(&stage);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let channel = "ctv".to_owned();
            let mut evaluations = 0_u64;
            let mut highest = 0;
            while !done.load(Ordering::Acquire) {
                let result = stage.process(50, &channel).expect("evaluation failed");
                highest = highest.max(result.into_value().unwrap_or(0));
                evaluations += 1;
            }
            (evaluations, highest)
        })
    };

    // Publishing an older config is skipped; a newer one swaps in.
    thread::sleep(Duration::from_millis(20));
    let stale = StageConfig {
        timestamp: config.timestamp.map(|t| t - Age::days(1)),
        ..config.clone()
    };
    let swapped = stage.refresh(&stale, &registry).expect("stale config failed");
    println!("stale refresh published: {swapped}");

    config.timestamp = Some(Utc::now());
    config.rule_sets[1].model_groups[1].rules[0].results[0].args = serde_json::json!(900);
    let swapped = stage.refresh(&config, &registry).expect("refresh failed");
    println!("fresh refresh published: {swapped}");

    thread::sleep(Duration::from_millis(20));
    done.store(true, Ordering::Release);
    let (evaluations, highest) = reader.join().expect("reader panicked");
    println!("reader ran {evaluations} evaluations; highest floor seen: {highest}");
    println!("live snapshot compiled at {}", stage.snapshot().timestamp());
}

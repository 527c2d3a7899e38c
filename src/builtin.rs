//! Functions that work for any value and context type.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use crate::{result_fn, schema_fn, AnalyticsTag, BoxError, FunctionRegistry, RuleResult};

pub const PERCENT: &str = "percent";
pub const LOG_A_TAG: &str = "logAtag";

#[derive(Debug, Deserialize)]
struct PercentArgs {
    pct: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogATagArgs {
    analytics_value: String,
}

fn decode<A: for<'de> Deserialize<'de>>(args: &JsonValue) -> Result<A, BoxError> {
    Ok(A::deserialize(args)?)
}

pub(crate) fn register<T: 'static, C: 'static>(
    registry: FunctionRegistry<T, C>,
) -> FunctionRegistry<T, C> {
    let random = Arc::clone(registry.random());
    registry
        .schema(PERCENT, move |args| {
            let PercentArgs { pct } = decode(args)?;
            if pct > 100 {
                return Err(format!("pct must be between 0 and 100, got {pct}").into());
            }
            let random = Arc::clone(&random);
            Ok(schema_fn(move |_: &T, _: &C| {
                Some((random.next_below(100) < pct).to_string())
            }))
        })
        .result(LOG_A_TAG, |args| {
            let LogATagArgs { analytics_value } = decode(args)?;
            Ok(result_fn(move |value: T, infra| {
                let tag = AnalyticsTag::new(infra.analytics_key()).with_values(json!({
                    "analyticsValue": analytics_value,
                    "modelVersion": infra.model_version(),
                    "conditionFired": infra.condition(),
                    "resultFunction": LOG_A_TAG,
                }));
                Ok(RuleResult::unaltered(value).with_tags([tag]))
            }))
        })
}

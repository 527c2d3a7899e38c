//! Conditional rule evaluation for request-processing pipelines.
//!
//! A stage's rules are compiled once from a declarative [`StageConfig`] into an
//! immutable [`StageSnapshot`]: schema functions turn each request into a key
//! path, a [`RuleTree`] with `*` wildcards selects the matching action list,
//! and the actions fold into a [`RuleResult`] whose [`RuleAction`] only ever
//! escalates. A [`LiveStage`] publishes new snapshots while evaluations are
//! running.
//!
//! # Quick start
//!
//! ```
//! use rulestage::{
//!     result_fn, schema_fn, FunctionRegistry, ModelGroupConfig, Rule, RuleAction, RuleResult,
//! };
//!
//! struct Request {
//!     media_type: &'static str,
//! }
//!
//! let registry: FunctionRegistry<u32, Request> = FunctionRegistry::new()
//!     .with_builtins()
//!     .schema("mediaType", |_| {
//!         Ok(schema_fn(|_: &u32, req: &Request| Some(req.media_type.to_owned())))
//!     })
//!     .result("dropBid", |_| Ok(result_fn(|_: u32, _| Ok(RuleResult::rejected()))));
//!
//! let group = ModelGroupConfig::from_dsl(
//!     r#"
//!     analytics "media" version "1"
//!     schema: mediaType
//!     when video: dropBid
//!     when *: logAtag(analyticsValue = "kept")
//!     "#,
//! )
//! .unwrap();
//! let rule = group.compile(&registry).unwrap();
//!
//! let kept = rule.process(150, &Request { media_type: "banner" }).unwrap();
//! assert_eq!(kept.action(), RuleAction::NoAction);
//! assert_eq!(kept.analytics_tags().len(), 1);
//!
//! let dropped = rule.process(150, &Request { media_type: "video" }).unwrap();
//! assert!(dropped.is_reject());
//! ```

mod builtin;
mod compile;
mod error;
pub mod parse;
mod registry;
mod rule;
mod snapshot;
pub mod tree;
mod types;
pub mod weighted;

pub use builtin::{LOG_A_TAG, PERCENT};
pub use error::RulestageError;
pub use parse::ParseError;
pub use registry::FunctionRegistry;
pub use rule::{
    CompositeRule, ConditionalRule, ConditionalRuleBuilder, DefaultActionRule, NoOpRule,
    RandomWeightedRule, Rule, RuleConfig, CONDITION_SEPARATOR, DEFAULT_CONDITION,
};
pub use snapshot::{LiveStage, StageSnapshot};
pub use tree::{Dimension, RuleTree, RuleTreeBuilder, TreeError, TreeMatch, UNDEFINED, WILDCARD};
pub use types::{
    result_fn, schema_fn, ActionResult, ActivityStatus, AnalyticsTag, BoxError, CompileError,
    EvaluationError, FunctionConfig, InfrastructureArgs, ModelGroupConfig, RejectedSeat,
    ResultBinding, ResultFunction, RuleAction, RuleEntry, RuleResult, RuleSetConfig,
    SchemaBinding, SchemaFunction, StageConfig,
};
pub use weighted::{RandomSource, SeededRandom, ThreadRandom, WeightedList};

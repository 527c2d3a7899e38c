mod action;
mod analytics;
mod config;
mod error;
mod function;
mod infra;
mod result;

pub use action::RuleAction;
pub use analytics::{ActivityStatus, AnalyticsTag, RejectedSeat};
pub use config::{FunctionConfig, ModelGroupConfig, RuleEntry, RuleSetConfig, StageConfig};
pub use error::{CompileError, EvaluationError};
pub use function::{
    result_fn, schema_fn, ActionResult, BoxError, ResultBinding, ResultFunction, SchemaBinding,
    SchemaFunction,
};
pub use infra::InfrastructureArgs;
pub use result::RuleResult;

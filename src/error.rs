use thiserror::Error;

use crate::parse::ParseError;
use crate::CompileError;

/// Unified error type covering parsing, compilation, and I/O.
///
/// Returned by the loaders [`StageConfig::from_json()`](crate::StageConfig::from_json),
/// [`StageConfig::from_file()`](crate::StageConfig::from_file),
/// [`ModelGroupConfig::from_file()`](crate::ModelGroupConfig::from_file) and the
/// parse-and-compile helpers
/// [`ConditionalRule::from_dsl()`](crate::ConditionalRule::from_dsl) and
/// [`ConditionalRule::from_file()`](crate::ConditionalRule::from_file).
#[derive(Debug, Error)]
pub enum RulestageError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

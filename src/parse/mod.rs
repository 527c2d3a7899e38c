//! Text form of a model group.
//!
//! ```text
//! # comment
//! analytics "floors" version "2024-01" weight 50
//! schema: mediaType, deviceCountry(fallback = "US")
//! when banner | US: logAtag(analyticsValue = "us-banner")
//! when banner | *: logAtag(analyticsValue = "banner")
//! default: logAtag(analyticsValue = "fallback")
//! ```

mod error;
mod grammar;

pub use error::ParseError;

use crate::ModelGroupConfig;

/// Parse DSL input into a [`ModelGroupConfig`].
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not valid DSL syntax.
pub fn parse(input: &str) -> Result<ModelGroupConfig, ParseError> {
    use winnow::Parser;
    grammar::model_group
        .parse(input)
        .map_err(|e| ParseError::at_offset(input, e.offset(), e.inner().to_string()))
}

use std::collections::HashMap;

/// Read-only bundle shared by every action in one evaluation.
///
/// Built once after the tree lookup (or once for a default action list) and
/// borrowed by each [`ResultFunction`](super::ResultFunction) in turn.
#[derive(Debug)]
pub struct InfrastructureArgs<'a, C> {
    context: &'a C,
    schema_results: HashMap<String, String>,
    matched_results: HashMap<String, String>,
    condition: &'a str,
    analytics_key: &'a str,
    model_version: &'a str,
}

impl<'a, C> InfrastructureArgs<'a, C> {
    pub(crate) fn new(
        context: &'a C,
        schema_results: HashMap<String, String>,
        matched_results: HashMap<String, String>,
        condition: &'a str,
        analytics_key: &'a str,
        model_version: &'a str,
    ) -> Self {
        Self {
            context,
            schema_results,
            matched_results,
            condition,
            analytics_key,
            model_version,
        }
    }

    #[must_use]
    pub fn context(&self) -> &'a C {
        self.context
    }

    /// Matcher extracted by each schema function, keyed by function name.
    /// Missing extractions appear as [`UNDEFINED`](crate::UNDEFINED).
    #[must_use]
    pub fn schema_results(&self) -> &HashMap<String, String> {
        &self.schema_results
    }

    /// Tree value consumed at each dimension, keyed by function name. Equal to
    /// [`WILDCARD`](crate::WILDCARD) where the dimension matched via wildcard.
    #[must_use]
    pub fn matched_results(&self) -> &HashMap<String, String> {
        &self.matched_results
    }

    /// Label of the condition that fired.
    #[must_use]
    pub fn condition(&self) -> &'a str {
        self.condition
    }

    #[must_use]
    pub fn analytics_key(&self) -> &'a str {
        self.analytics_key
    }

    #[must_use]
    pub fn model_version(&self) -> &'a str {
        self.model_version
    }
}

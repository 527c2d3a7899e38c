use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::rule::ConditionalRule;
use crate::snapshot::StageSnapshot;
use crate::{CompileError, FunctionRegistry, RulestageError};

const DEFAULT_WEIGHT: u32 = 100;

fn enabled() -> bool {
    true
}

fn default_weight() -> u32 {
    DEFAULT_WEIGHT
}

/// Declarative description of the rules for one pipeline stage.
///
/// Enabled rule sets run in order against the same input; each one picks a
/// model group by weight.
///
/// # Example
///
/// ```
/// use rulestage::StageConfig;
///
/// let config = StageConfig::from_json(r#"{
///     "timestamp": "2024-05-01T00:00:00Z",
///     "ruleSets": [{
///         "name": "privacy",
///         "modelGroups": [{
///             "analyticsKey": "privacy",
///             "version": "1",
///             "schema": [{ "function": "percent", "args": { "pct": 50 } }],
///             "rules": [{
///                 "conditions": ["true"],
///                 "results": [{ "function": "logAtag", "args": { "analyticsValue": "sampled" } }]
///             }]
///         }]
///     }]
/// }"#).unwrap();
/// assert_eq!(config.rule_sets.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageConfig {
    #[serde(default = "enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rule_sets: Vec<RuleSetConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSetConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default = "enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub model_groups: Vec<ModelGroupConfig>,
}

/// One tree-driven rule: schema dimensions, conditional rules and an optional
/// default action list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelGroupConfig {
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(default)]
    pub analytics_key: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub schema: Vec<FunctionConfig>,
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
    #[serde(default)]
    pub default: Vec<FunctionConfig>,
}

/// One path through the rule tree. `"*"` marks a wildcard dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleEntry {
    pub conditions: Vec<String>,
    pub results: Vec<FunctionConfig>,
}

/// A function name plus its opaque arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionConfig {
    pub function: String,
    #[serde(default, skip_serializing_if = "JsonValue::is_null")]
    pub args: JsonValue,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timestamp: None,
            rule_sets: Vec::new(),
        }
    }
}

impl Default for ModelGroupConfig {
    fn default() -> Self {
        Self {
            weight: DEFAULT_WEIGHT,
            analytics_key: String::new(),
            version: String::new(),
            schema: Vec::new(),
            rules: Vec::new(),
            default: Vec::new(),
        }
    }
}

impl FunctionConfig {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            args: JsonValue::Null,
        }
    }

    #[must_use]
    pub fn with_args(mut self, args: JsonValue) -> Self {
        self.args = args;
        self
    }
}

impl StageConfig {
    /// Parse a JSON stage description.
    ///
    /// # Errors
    ///
    /// Returns [`RulestageError::Json`] on malformed input.
    pub fn from_json(input: &str) -> Result<Self, RulestageError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Read and parse a JSON stage description.
    ///
    /// # Errors
    ///
    /// Returns [`RulestageError`] on I/O or JSON failure.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, RulestageError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_json(&input)
    }

    /// Compile into an immutable snapshot ready to publish.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] on any invalid function, condition or weight.
    pub fn compile<T, C>(
        &self,
        registry: &FunctionRegistry<T, C>,
    ) -> Result<StageSnapshot<T, C>, CompileError>
    where
        T: Clone + 'static,
        C: 'static,
    {
        let rule = crate::compile::compile_stage(self, registry)?;
        let timestamp = self.timestamp.unwrap_or_else(Utc::now);
        Ok(StageSnapshot::new(timestamp, rule))
    }
}

impl ModelGroupConfig {
    /// Parse a model group from the text rule DSL.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`](crate::parse::ParseError) on invalid syntax.
    pub fn from_dsl(input: &str) -> Result<Self, crate::parse::ParseError> {
        crate::parse::parse(input)
    }

    /// Read a DSL file and parse it.
    ///
    /// # Errors
    ///
    /// Returns [`RulestageError`] on I/O or parse failure.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, RulestageError> {
        let input = std::fs::read_to_string(path)?;
        Ok(Self::from_dsl(&input)?)
    }

    /// Compile into a tree-driven rule.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] on unknown functions, bad arguments or
    /// malformed conditions.
    pub fn compile<T, C>(
        &self,
        registry: &FunctionRegistry<T, C>,
    ) -> Result<ConditionalRule<T, C>, CompileError>
    where
        T: 'static,
        C: 'static,
    {
        crate::compile::compile_model_group(self, registry)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config = StageConfig::from_json(r#"{"ruleSets":[{"modelGroups":[{}]}]}"#).unwrap();
        assert!(config.enabled);
        assert!(config.timestamp.is_none());
        let group = &config.rule_sets[0].model_groups[0];
        assert!(config.rule_sets[0].enabled);
        assert_eq!(group.weight, 100);
        assert!(group.schema.is_empty());
        assert!(group.default.is_empty());
    }

    #[test]
    fn parses_full_document() {
        let config = StageConfig::from_json(
            r#"{
                "enabled": false,
                "timestamp": "2024-05-01T12:00:00Z",
                "ruleSets": [{
                    "name": "floors",
                    "modelGroups": [{
                        "weight": 25,
                        "analyticsKey": "floors",
                        "version": "2",
                        "schema": [{ "function": "mediaType" }],
                        "rules": [{
                            "conditions": ["banner"],
                            "results": [{ "function": "logAtag", "args": { "analyticsValue": "b" } }]
                        }],
                        "default": [{ "function": "logAtag", "args": { "analyticsValue": "d" } }]
                    }]
                }]
            }"#,
        )
        .unwrap();

        assert!(!config.enabled);
        assert_eq!(
            config.timestamp.unwrap().to_rfc3339(),
            "2024-05-01T12:00:00+00:00"
        );
        let group = &config.rule_sets[0].model_groups[0];
        assert_eq!(group.weight, 25);
        assert_eq!(group.schema, [FunctionConfig::new("mediaType")]);
        assert_eq!(group.rules[0].conditions, ["banner"]);
        assert_eq!(
            group.rules[0].results[0],
            FunctionConfig::new("logAtag").with_args(json!({ "analyticsValue": "b" }))
        );
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = StageConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, RulestageError::Json(_)));
    }

    #[test]
    fn null_args_are_not_serialized() {
        let encoded = serde_json::to_value(FunctionConfig::new("mediaType")).unwrap();
        assert_eq!(encoded, json!({ "function": "mediaType" }));
    }
}

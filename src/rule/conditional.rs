use std::collections::HashMap;
use std::fmt;

use super::{apply_actions, DefaultActionRule, Rule};
use crate::tree::{Dimension, RuleTree, RuleTreeBuilder, TreeError};
use crate::{
    CompileError, EvaluationError, FunctionRegistry, InfrastructureArgs, ModelGroupConfig,
    ResultBinding, RuleResult, RulestageError, SchemaBinding, UNDEFINED,
};

/// Separator used when rendering a condition path as a label.
pub const CONDITION_SEPARATOR: &str = "|";

/// A tree leaf: the label of the condition that leads to it and the actions
/// to run when it fires.
pub struct RuleConfig<T, C> {
    condition: String,
    actions: Vec<ResultBinding<T, C>>,
}

impl<T, C> RuleConfig<T, C> {
    #[must_use]
    pub fn condition(&self) -> &str {
        &self.condition
    }

    #[must_use]
    pub fn actions(&self) -> &[ResultBinding<T, C>] {
        &self.actions
    }
}

impl<T, C> fmt::Debug for RuleConfig<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleConfig")
            .field("condition", &self.condition)
            .field("actions", &self.actions)
            .finish()
    }
}

/// The tree-driven rule.
///
/// Each schema binding extracts one matcher; the matcher list is looked up in
/// the rule tree and the matching leaf's actions are folded over the value.
/// On a miss the optional default tier runs; without one the value passes
/// through unaltered.
pub struct ConditionalRule<T, C> {
    analytics_key: String,
    model_version: String,
    schema: Vec<SchemaBinding<T, C>>,
    tree: RuleTree<RuleConfig<T, C>>,
    default: Option<DefaultActionRule<T, C>>,
}

impl<T, C> ConditionalRule<T, C> {
    /// Start building a rule with the given analytics identity.
    pub fn builder(
        analytics_key: impl Into<String>,
        model_version: impl Into<String>,
    ) -> ConditionalRuleBuilder<T, C> {
        ConditionalRuleBuilder {
            analytics_key: analytics_key.into(),
            model_version: model_version.into(),
            schema: Vec::new(),
            rules: Vec::new(),
            default: Vec::new(),
        }
    }

    #[must_use]
    pub fn analytics_key(&self) -> &str {
        &self.analytics_key
    }

    #[must_use]
    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    /// Schema function names in dimension order.
    pub fn dimensions(&self) -> impl Iterator<Item = &str> {
        self.schema.iter().map(SchemaBinding::name)
    }

    #[must_use]
    pub fn tree(&self) -> &RuleTree<RuleConfig<T, C>> {
        &self.tree
    }

    #[must_use]
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Extract the matcher for every dimension, replacing absent or empty
    /// extractions with [`UNDEFINED`].
    pub fn extract_matchers(&self, value: &T, context: &C) -> Vec<String> {
        self.schema
            .iter()
            .map(|binding| match binding.extract(value, context) {
                Some(matcher) if !matcher.is_empty() => matcher,
                _ => UNDEFINED.to_owned(),
            })
            .collect()
    }
}

impl<T: 'static, C: 'static> ConditionalRule<T, C> {
    /// Parse a model group from the text DSL and compile it against
    /// `registry`.
    ///
    /// This is a convenience method combining
    /// [`ModelGroupConfig::from_dsl()`] and [`ModelGroupConfig::compile()`].
    ///
    /// # Errors
    ///
    /// Returns [`RulestageError`] on parse or compile failure.
    pub fn from_dsl(input: &str, registry: &FunctionRegistry<T, C>) -> Result<Self, RulestageError> {
        let group = ModelGroupConfig::from_dsl(input)?;
        Ok(group.compile(registry)?)
    }

    /// Read a DSL file and compile it against `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`RulestageError`] on I/O, parse, or compile failure.
    pub fn from_file(
        path: impl AsRef<std::path::Path>,
        registry: &FunctionRegistry<T, C>,
    ) -> Result<Self, RulestageError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_dsl(&input, registry)
    }
}

impl<T, C> Rule<T, C> for ConditionalRule<T, C> {
    fn process(&self, value: T, context: &C) -> Result<RuleResult<T>, EvaluationError> {
        let matchers = self.extract_matchers(&value, context);

        let Some(hit) = self.tree.lookup(&matchers) else {
            return match &self.default {
                Some(default) => {
                    tracing::debug!(
                        analytics_key = %self.analytics_key,
                        ?matchers,
                        "no condition matched; running default actions"
                    );
                    default.process(value, context)
                }
                None => {
                    tracing::debug!(
                        analytics_key = %self.analytics_key,
                        ?matchers,
                        "no condition matched; passing value through"
                    );
                    Ok(RuleResult::unaltered(value))
                }
            };
        };

        let mut schema_results = HashMap::with_capacity(self.schema.len());
        let mut matched_results = HashMap::with_capacity(self.schema.len());
        for ((binding, matcher), matched) in self.schema.iter().zip(matchers).zip(&hit.matched) {
            schema_results.insert(binding.name().to_owned(), matcher);
            matched_results.insert(binding.name().to_owned(), (*matched).to_owned());
        }

        let args = InfrastructureArgs::new(
            context,
            schema_results,
            matched_results,
            &hit.leaf.condition,
            &self.analytics_key,
            &self.model_version,
        );
        apply_actions(value, &hit.leaf.actions, &args)
    }
}

impl<T, C> fmt::Debug for ConditionalRule<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionalRule")
            .field("analytics_key", &self.analytics_key)
            .field("model_version", &self.model_version)
            .field("schema", &self.schema)
            .field("conditions", &self.tree.len())
            .field("default", &self.default)
            .finish()
    }
}

/// Builder for a [`ConditionalRule`]. Errors surface from
/// [`build()`](Self::build).
pub struct ConditionalRuleBuilder<T, C> {
    analytics_key: String,
    model_version: String,
    schema: Vec<SchemaBinding<T, C>>,
    rules: Vec<(Vec<Dimension>, Vec<ResultBinding<T, C>>)>,
    default: Vec<ResultBinding<T, C>>,
}

impl<T, C> ConditionalRuleBuilder<T, C> {
    /// Append a schema binding. Call order is dimension order.
    #[must_use]
    pub fn schema(mut self, binding: SchemaBinding<T, C>) -> Self {
        self.schema.push(binding);
        self
    }

    /// Add a condition path (one segment per dimension, `"*"` for the
    /// wildcard) and the actions to run when it matches.
    #[must_use]
    pub fn when<S: AsRef<str>>(mut self, conditions: &[S], actions: Vec<ResultBinding<T, C>>) -> Self {
        let path = conditions.iter().map(|c| Dimension::parse(c.as_ref())).collect();
        self.rules.push((path, actions));
        self
    }

    /// Actions to run when no condition matches.
    #[must_use]
    pub fn default_actions(mut self, actions: Vec<ResultBinding<T, C>>) -> Self {
        self.default = actions;
        self
    }

    /// Compile the conditions into a rule tree.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::ConditionArity`] when a condition's length
    /// differs from the number of schema bindings and
    /// [`CompileError::DuplicateCondition`] when two conditions share a path.
    pub fn build(self) -> Result<ConditionalRule<T, C>, CompileError> {
        let mut tree = RuleTreeBuilder::new(self.schema.len());
        for (path, actions) in self.rules {
            let condition = path
                .iter()
                .map(Dimension::as_str)
                .collect::<Vec<_>>()
                .join(CONDITION_SEPARATOR);
            let config = RuleConfig {
                condition: condition.clone(),
                actions,
            };
            tree.insert(&path, config).map_err(|err| match err {
                TreeError::DepthMismatch { expected, found } => CompileError::ConditionArity {
                    condition,
                    expected,
                    found,
                },
                TreeError::DuplicatePath => CompileError::DuplicateCondition { condition },
            })?;
        }

        let default = if self.default.is_empty() {
            None
        } else {
            Some(DefaultActionRule::new(
                self.default,
                self.analytics_key.clone(),
                self.model_version.clone(),
            ))
        };

        Ok(ConditionalRule {
            analytics_key: self.analytics_key,
            model_version: self.model_version,
            schema: self.schema,
            tree: tree.build(),
            default,
        })
    }
}

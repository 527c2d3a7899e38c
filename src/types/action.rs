use std::fmt;

use serde::{Deserialize, Serialize};

/// The verdict a rule or action produced for a value.
///
/// Variants are ordered by dominance: `Reject` beats `Update`, which beats
/// `NoAction`. [`RuleAction::merge`] picks the dominant side.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    #[default]
    NoAction,
    Update,
    Reject,
}

impl RuleAction {
    /// Combine two verdicts, keeping the dominant one.
    #[must_use]
    pub fn merge(self, other: RuleAction) -> RuleAction {
        self.max(other)
    }
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleAction::NoAction => write!(f, "no_action"),
            RuleAction::Update => write!(f, "update"),
            RuleAction::Reject => write!(f, "reject"),
        }
    }
}

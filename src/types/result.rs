use super::action::RuleAction;
use super::analytics::{AnalyticsTag, RejectedSeat};

/// The outcome of running a rule or a single action against a value.
///
/// The value is present unless the action is [`RuleAction::Reject`]; the
/// constructors are the only way to build a result, so the pairing always
/// holds. Partial results are combined with [`RuleResult::merge`].
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct RuleResult<T> {
    value: Option<T>,
    action: RuleAction,
    analytics_tags: Vec<AnalyticsTag>,
    rejected_seats: Vec<RejectedSeat>,
}

impl<T> RuleResult<T> {
    /// Pass the value through with no action, tags or rejections.
    pub fn unaltered(value: T) -> Self {
        Self::with_action(Some(value), RuleAction::NoAction)
    }

    /// The value was transformed.
    pub fn updated(value: T) -> Self {
        Self::with_action(Some(value), RuleAction::Update)
    }

    /// The value was rejected and is dropped.
    pub fn rejected() -> Self {
        Self::with_action(None, RuleAction::Reject)
    }

    fn with_action(value: Option<T>, action: RuleAction) -> Self {
        Self {
            value,
            action,
            analytics_tags: Vec::new(),
            rejected_seats: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = AnalyticsTag>) -> Self {
        self.analytics_tags.extend(tags);
        self
    }

    pub fn with_rejected_seats(mut self, seats: impl IntoIterator<Item = RejectedSeat>) -> Self {
        self.rejected_seats.extend(seats);
        self
    }

    #[must_use]
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    #[must_use]
    pub fn into_value(self) -> Option<T> {
        self.value
    }

    #[must_use]
    pub fn action(&self) -> RuleAction {
        self.action
    }

    #[must_use]
    pub fn is_reject(&self) -> bool {
        self.action == RuleAction::Reject
    }

    #[must_use]
    pub fn analytics_tags(&self) -> &[AnalyticsTag] {
        &self.analytics_tags
    }

    #[must_use]
    pub fn rejected_seats(&self) -> &[RejectedSeat] {
        &self.rejected_seats
    }

    /// Split into `(value, action, tags, rejected seats)`.
    #[must_use]
    pub fn into_parts(self) -> (Option<T>, RuleAction, Vec<AnalyticsTag>, Vec<RejectedSeat>) {
        (
            self.value,
            self.action,
            self.analytics_tags,
            self.rejected_seats,
        )
    }

    /// Fold `later` into `self`.
    ///
    /// The dominant action wins, the value comes from `later` unless the
    /// merged action is a reject, and tags and rejected seats are
    /// concatenated with `self`'s entries first.
    pub fn merge(mut self, later: RuleResult<T>) -> Self {
        let action = self.action.merge(later.action);
        let value = if action == RuleAction::Reject {
            None
        } else {
            later.value
        };
        self.analytics_tags.extend(later.analytics_tags);
        self.rejected_seats.extend(later.rejected_seats);
        Self {
            value,
            action,
            analytics_tags: self.analytics_tags,
            rejected_seats: self.rejected_seats,
        }
    }

    /// Move the value out for the next action in a fold. The running result
    /// keeps its tags and action; a reject yields `None`.
    pub(crate) fn take_value(&mut self) -> Option<T> {
        self.value.take()
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Outcome recorded on an [`AnalyticsTag`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    #[default]
    Success,
    Rejected,
}

/// One analytics entry emitted by an action, handed to the reporting
/// collaborator untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsTag {
    pub activity: String,
    #[serde(default)]
    pub status: ActivityStatus,
    #[serde(default)]
    pub values: JsonValue,
}

impl AnalyticsTag {
    /// A successful tag for `activity` with no attached values.
    pub fn new(activity: impl Into<String>) -> Self {
        Self {
            activity: activity.into(),
            status: ActivityStatus::Success,
            values: JsonValue::Null,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: ActivityStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_values(mut self, values: JsonValue) -> Self {
        self.values = values;
        self
    }
}

/// Records that a bidding participant's response was excluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedSeat {
    pub seat: String,
    #[serde(default)]
    pub imp_ids: Vec<String>,
    pub code: u16,
}

impl RejectedSeat {
    pub fn new(seat: impl Into<String>, code: u16) -> Self {
        Self {
            seat: seat.into(),
            imp_ids: Vec::new(),
            code,
        }
    }

    #[must_use]
    pub fn with_imp_ids<I, S>(mut self, imp_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.imp_ids = imp_ids.into_iter().map(Into::into).collect();
        self
    }
}

//! Survey prompt gating.
//!
//! A user's feedback prompt moves through three states:
//!
//! ```text
//!   show ──record_view──▶ show ──record_view──▶ must_show ──▶ must_show ...
//!     │                     │                       │
//!     └─────────────── mark_completed ──────────────┴──▶ dont_show (terminal)
//! ```
//!
//! All functions here are pure transforms over a [`SurveyRecord`]; the caller
//! persists the returned record.

use serde::{Deserialize, Serialize};

/// Number of views after which the prompt can no longer be skipped.
pub const MUST_SHOW_AFTER: u32 = 3;

/// Per-user prompt state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyRecord {
    pub user_id: String,
    pub times_shown: u32,
    pub is_completed: bool,
}

impl SurveyRecord {
    /// A record that has never been shown.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            times_shown: 0,
            is_completed: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurveyStatus {
    /// Prompt is shown and may be skipped
    Show,
    /// Prompt is shown and may not be skipped
    MustShow,
    /// Survey is completed; never prompt again
    DontShow,
}

impl SurveyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurveyStatus::Show => "show",
            SurveyStatus::MustShow => "must_show",
            SurveyStatus::DontShow => "dont_show",
        }
    }
}

/// Wire projection returned by every status endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub status: SurveyStatus,
    pub count: u32,
}

impl From<&SurveyRecord> for StatusReport {
    fn from(record: &SurveyRecord) -> Self {
        Self {
            status: get_status(record),
            count: record.times_shown,
        }
    }
}

/// Completion always wins over the view counter.
pub fn get_status(record: &SurveyRecord) -> SurveyStatus {
    if record.is_completed {
        return SurveyStatus::DontShow;
    }

    if record.times_shown >= MUST_SHOW_AFTER {
        return SurveyStatus::MustShow;
    }

    SurveyStatus::Show
}

/// Count one more view. A completed record's counter is frozen.
pub fn record_view(record: SurveyRecord) -> SurveyRecord {
    if record.is_completed {
        return record;
    }

    SurveyRecord {
        times_shown: record.times_shown.saturating_add(1),
        ..record
    }
}

/// Idempotent transition into the terminal state.
pub fn mark_completed(record: SurveyRecord) -> SurveyRecord {
    SurveyRecord {
        is_completed: true,
        ..record
    }
}

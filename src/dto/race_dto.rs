use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current race event as reported by the server. The client never computes
/// lock status, it only mirrors `picks_locked` and `lock_time`.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    pub race_name: String,
    pub week_number: i64,
    pub race_date: DateTime<Utc>,
    pub picks_locked: bool,
    pub lock_time: Option<DateTime<Utc>>,
    pub has_sprint: bool,
    pub country: Option<String>,
}

/// Which pick sheet an operation targets. Sprint weekends carry both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Race,
    Sprint,
}

impl EventType {
    /// Path prefix for the pick endpoints of this event type.
    pub fn picks_path(self) -> &'static str {
        match self {
            EventType::Race => "picks/v2",
            EventType::Sprint => "sprint-picks/v2",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EventType::Race => "race",
            EventType::Sprint => "sprint",
        }
    }
}

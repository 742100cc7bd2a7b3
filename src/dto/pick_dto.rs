use serde::{Deserialize, Serialize};

/// An in-progress selection for one grid position.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pick {
    pub position: u8,
    pub driver_id: i64,
}

/// Submission body for the pick endpoints. The server derives the week
/// from the current race event.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPicks {
    pub league_id: i64,
    pub picks: Vec<Pick>,
}

/// Server-confirmed pick. Authoritative; supersedes the local `Pick` for
/// the same position once fetched.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserPick {
    pub id: i64,
    pub league_id: i64,
    pub week_number: i64,
    pub position: u8,
    pub driver_id: i64,
    pub driver_name: String,
    pub driver_team: String,
    pub is_locked: bool,
    pub is_scored: bool,
    pub points: Option<i64>,
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_points: i64,
    pub races_played: i64,
    pub correct_picks: i64,
    pub total_picks: i64,
    pub best_week_points: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    pub total_users: i64,
    pub total_picks: i64,
    pub average_points: f64,
    pub most_picked_driver: Option<String>,
}

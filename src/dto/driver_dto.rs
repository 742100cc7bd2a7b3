use serde::{Deserialize, Serialize};

/// Reference data, fetched once per screen load.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub id: i64,
    pub name: String,
    pub team: String,
    pub driver_number: i64,
    pub country: String,
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct League {
    pub id: i64,
    pub name: String,
    pub required_positions: Vec<u8>,
    pub is_public: bool,
    pub member_count: Option<i64>,
    pub created_by: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeague {
    pub name: String,
    pub required_positions: Vec<u8>,
    pub is_public: bool,
}

use crate::api::client::ApiClient;
use crate::dto::stats_dto::{GlobalStats, UserStats};
use crate::error::ClientError;

pub async fn get_user_stats(client: &ApiClient) -> Result<UserStats, ClientError> {
    client.get("users/stats").await
}

pub async fn get_global_stats(client: &ApiClient) -> Result<GlobalStats, ClientError> {
    client.get("users/global-stats").await
}

/// Asks the server to recompute this user's aggregates and returns the
/// fresh numbers.
pub async fn refresh_user_stats(client: &ApiClient) -> Result<UserStats, ClientError> {
    client.post("users/stats", &serde_json::json!({})).await
}

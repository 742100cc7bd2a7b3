use crate::api::client::ApiClient;
use crate::dto::race_dto::Race;
use crate::error::ClientError;

/// Current race event, including the authoritative lock status.
pub async fn get_current_race(client: &ApiClient) -> Result<Race, ClientError> {
    client.get("f1races/current").await
}

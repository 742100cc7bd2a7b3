use crate::api::client::ApiClient;
use crate::dto::driver_dto::Driver;
use crate::error::ClientError;

pub async fn get_drivers(client: &ApiClient) -> Result<Vec<Driver>, ClientError> {
    client.get("drivers").await
}

use tracing::info;

use crate::api::client::ApiClient;
use crate::dto::user_dto::{AuthPayload, CreateUser, LoginUser};
use crate::error::ClientError;

pub async fn login(
    client: &ApiClient,
    username: &str,
    password: &str,
) -> Result<AuthPayload, ClientError> {
    info!("Logging in as {}.", username);
    let body = LoginUser {
        username: username.to_string(),
        password: password.to_string(),
    };
    client.post("users/login", &body).await
}

pub async fn signup(client: &ApiClient, new_user: &CreateUser) -> Result<AuthPayload, ClientError> {
    info!("Creating account {}.", new_user.username);
    client.post("users/signup", new_user).await
}

/// Exchanges the installed bearer token for a fresh one.
pub async fn refresh(client: &ApiClient) -> Result<AuthPayload, ClientError> {
    info!("Refreshing session token.");
    client.post("users/refresh", &serde_json::json!({})).await
}

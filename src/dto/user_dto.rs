use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct LoginUser {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct CreateUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
}

/// Returned by login, signup and refresh.
#[derive(Debug, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
}

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{info, warn};

use crate::api::auth;
use crate::api::client::ApiClient;
use crate::dto::claims_dto::Claims;
use crate::dto::user_dto::{CreateUser, User};
use crate::error::ClientError;

/// Refresh the token ahead of time when it expires within this window.
const REFRESH_WINDOW_SECS: i64 = 3600;

#[derive(sqlx::FromRow)]
struct SessionRow {
    token: String,
    user_json: String,
}

/// Holds the authenticated user and token, persists them in a small
/// SQLite database, and installs the bearer token on the API client.
pub struct SessionManager {
    client: Arc<ApiClient>,
    pool: SqlitePool,
}

impl SessionManager {
    pub async fn open(client: Arc<ApiClient>, db_path: &Path) -> Result<Self, ClientError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|_| ClientError::NoDataDir)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS session (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                token TEXT NOT NULL,
                user_json TEXT NOT NULL,
                saved_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { client, pool })
    }

    /// Restores a stored session on startup. Expired sessions are dropped,
    /// sessions close to expiry are refreshed against the server.
    pub async fn restore(&self) -> Result<Option<User>, ClientError> {
        let Some((token, user)) = self.load().await? else {
            return Ok(None);
        };

        let expiry = token_expiry(&token)?;
        let now = Utc::now().timestamp();
        if expiry <= now {
            warn!("Stored session has expired, clearing it.");
            self.clear().await?;
            return Ok(None);
        }

        self.client.set_token(Some(token)).await;

        if expiry - now < REFRESH_WINDOW_SECS {
            match auth::refresh(&self.client).await {
                Ok(payload) => {
                    self.persist(&payload.token, &payload.user).await?;
                    self.client.set_token(Some(payload.token)).await;
                    return Ok(Some(payload.user));
                }
                Err(e) => {
                    // The old token is still valid, keep going with it.
                    warn!("Token refresh failed: {}", e);
                }
            }
        }

        Ok(Some(user))
    }

    /// Restores the session and fails when there is none.
    pub async fn require_user(&self) -> Result<User, ClientError> {
        self.restore().await?.ok_or(ClientError::NotLoggedIn)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<User, ClientError> {
        let payload = auth::login(&self.client, username, password).await?;
        self.persist(&payload.token, &payload.user).await?;
        self.client.set_token(Some(payload.token)).await;
        info!("Logged in as {}.", payload.user.username);
        Ok(payload.user)
    }

    pub async fn signup(&self, new_user: &CreateUser) -> Result<User, ClientError> {
        let payload = auth::signup(&self.client, new_user).await?;
        self.persist(&payload.token, &payload.user).await?;
        self.client.set_token(Some(payload.token)).await;
        info!("Account {} created and logged in.", payload.user.username);
        Ok(payload.user)
    }

    /// Tokens are stateless, logout only needs to clear local state.
    pub async fn logout(&self) -> Result<(), ClientError> {
        self.clear().await?;
        self.client.set_token(None).await;
        info!("Logged out.");
        Ok(())
    }

    pub async fn current_user(&self) -> Result<Option<User>, ClientError> {
        Ok(self.load().await?.map(|(_, user)| user))
    }

    async fn persist(&self, token: &str, user: &User) -> Result<(), ClientError> {
        let user_json = serde_json::to_string(user)?;
        sqlx::query(
            r#"
            INSERT INTO session (id, token, user_json, saved_at)
            VALUES (1, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                token = excluded.token,
                user_json = excluded.user_json,
                saved_at = excluded.saved_at
            "#,
        )
        .bind(token)
        .bind(user_json)
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load(&self) -> Result<Option<(String, User)>, ClientError> {
        let row = sqlx::query_as::<_, SessionRow>("SELECT token, user_json FROM session WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let user: User = serde_json::from_str(&row.user_json)?;
                Ok(Some((row.token, user)))
            }
            None => Ok(None),
        }
    }

    async fn clear(&self) -> Result<(), ClientError> {
        sqlx::query("DELETE FROM session WHERE id = 1")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Reads the `exp` claim without verifying the signature. The server is
/// the enforcement point; the client only needs to know when to refresh.
fn token_expiry(token: &str) -> Result<i64, ClientError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims.exp as i64)
}

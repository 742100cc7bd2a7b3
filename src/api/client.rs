use std::future::Future;
use std::time::Duration;

use rand::Rng;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::warn;

use crate::dto::api_response_dto::ApiResponse;
use crate::error::ClientError;

/// Retries applied to initial data-load calls that hit a 429.
pub const MAX_LOAD_RETRIES: u32 = 3;

/// HTTP client for the prediction game API. Owns the base URL and the
/// bearer token; the session manager installs and clears the token.
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            token: RwLock::new(None),
        }
    }

    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(self.http.get(self.url(path))).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        self.send(self.http.get(self.url(path)).query(query)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send(self.http.post(self.url(path)).json(body)).await
    }

    /// POST for endpoints whose envelope carries no `data` worth keeping.
    pub async fn post_unit<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ClientError> {
        self.send_unit(self.http.post(self.url(path)).json(body))
            .await
    }

    pub async fn delete_unit(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<(), ClientError> {
        self.send_unit(self.http.delete(self.url(path)).query(query))
            .await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let envelope: ApiResponse<T> = self.execute(request).await?;
        envelope
            .data
            .ok_or_else(|| ClientError::BadResponse("missing data field".to_string()))
    }

    async fn send_unit(&self, request: RequestBuilder) -> Result<(), ClientError> {
        let _: ApiResponse<serde_json::Value> = self.execute(request).await?;
        Ok(())
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<ApiResponse<T>, ClientError> {
        let request = match self.token.read().await.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ClientError::RateLimited);
        }
        if status.is_server_error() {
            return Err(ClientError::Server {
                status: status.as_u16(),
            });
        }

        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| ClientError::BadResponse(e.to_string()))?;

        if !envelope.success {
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                message: envelope.failure_message(),
            });
        }

        Ok(envelope)
    }
}

/// Delay before retry number `retry` (0-based): 1s, 2s, 4s, plus up to
/// 250ms of jitter.
pub fn backoff_delay(retry: u32) -> Duration {
    let base = Duration::from_secs(1 << retry);
    let jitter = Duration::from_millis(rand::rng().random_range(0..250));
    base + jitter
}

/// Runs a data-load call, retrying on 429 with exponential backoff. Any
/// other error, and a 429 that survives all retries, is returned as-is.
pub async fn with_backoff<T, F, Fut>(mut operation: F) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let mut retry = 0;
    loop {
        match operation().await {
            Err(ClientError::RateLimited) if retry < MAX_LOAD_RETRIES => {
                let delay = backoff_delay(retry);
                warn!("rate limited, retrying in {:?}", delay);
                tokio::time::sleep(delay).await;
                retry += 1;
            }
            other => return other,
        }
    }
}

use serde::Deserialize;

/// Envelope every API response arrives in:
/// `{success: boolean, data?, error?, message?}`.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// The human-readable failure reason, wherever the server put it.
    pub fn failure_message(&self) -> String {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "request rejected".to_string())
    }
}

use std::path::PathBuf;

use crate::error::ClientError;

const SESSION_DB_FILE: &str = "session.db";

/// Resolved client configuration. Built once in `main` and passed down,
/// never read from globals.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub session_db: PathBuf,
}

impl ClientConfig {
    pub fn resolve(api_url: String, data_dir: Option<PathBuf>) -> Result<Self, ClientError> {
        let dir = match data_dir {
            Some(dir) => dir,
            None => dirs::data_dir()
                .ok_or(ClientError::NoDataDir)?
                .join("pitwall"),
        };

        Ok(Self {
            api_url,
            session_db: dir.join(SESSION_DB_FILE),
        })
    }
}

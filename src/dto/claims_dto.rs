use serde::{Deserialize, Serialize};

/// JWT claims the server issues. The client never verifies the signature,
/// it only reads `exp` to decide when to refresh.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

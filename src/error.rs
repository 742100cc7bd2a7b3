use thiserror::Error;

/// Everything that can go wrong on the client side. Server-reported
/// failures carry the server's message; local precondition failures are
/// raised before any network call is made.
#[derive(Debug, Error)]
pub enum ClientError {
    // Transport and server errors
    #[error("network error: {0}")]
    Network(String),
    #[error("rate limited by the server")]
    RateLimited,
    #[error("server error ({status})")]
    Server { status: u16 },
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("malformed response from server: {0}")]
    BadResponse(String),

    // Session errors
    #[error("not logged in")]
    NotLoggedIn,
    #[error("invalid session token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("local storage error: {0}")]
    Storage(#[from] sqlx::Error),
    #[error("corrupt session state: {0}")]
    SessionState(#[from] serde_json::Error),
    #[error("could not find a data directory for session storage")]
    NoDataDir,

    // Pick flow preconditions, all checked before any network call
    #[error("picks are locked for this race")]
    PicksLocked,
    #[error("position {0} is locked")]
    PositionLocked(u8),
    #[error("position {0} is not part of this league")]
    PositionNotRequired(u8),
    #[error("driver {driver_id} is already picked at position {position}")]
    DriverAlreadyPicked { driver_id: i64, position: u8 },
    #[error("no pick at position {0}")]
    NoPickAtPosition(u8),
    #[error("a submission for position {0} is still in flight")]
    SubmissionInFlight(u8),
    #[error("this race weekend has no sprint")]
    NoSprintScheduled,

    // League creation preconditions
    #[error("a league needs at least one required position")]
    NoPositions,
    #[error("invalid grid position {0}, must be between 1 and 20")]
    InvalidPosition(u8),
    #[error("duplicate grid position {0}")]
    DuplicatePosition(u8),
}

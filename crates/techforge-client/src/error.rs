use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SocketError {
    #[error("Could not connect to solver: {0}")]
    Connect(String),

    #[error("No response from solver within {0:?}")]
    Timeout(Duration),

    #[error("Connection to solver was lost")]
    Disconnected,

    #[error("Channel is closed")]
    Closed,

    #[error("Malformed frame: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Channel(#[from] SocketError),

    #[error("Invalid API response format")]
    InvalidResponse,
}

pub type SocketResult<T> = Result<T, SocketError>;
pub type SessionResult<T> = Result<T, SessionError>;

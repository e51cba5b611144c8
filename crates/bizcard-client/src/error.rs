use thiserror::Error;
use uuid::Uuid;

use bizcard_types::models::ValidationError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("not signed in")]
    Unauthorized,
    #[error("not allowed for this account")]
    Forbidden,
    #[error("not found")]
    NotFound,
    #[error("you already have a card ({existing}); edit it instead")]
    CardLimitReached { existing: Uuid },
    #[error("invalid card: {0}")]
    Validation(#[from] ValidationError),
    #[error("backend is unreachable")]
    Offline,
    #[error("local cache I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("local cache entry is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// Errors that mean "could not reach a working backend", as opposed to
    /// the backend refusing the request. Only these fall back to the cache.
    pub fn is_connectivity(&self) -> bool {
        match self {
            ClientError::Offline => true,
            ClientError::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            ClientError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

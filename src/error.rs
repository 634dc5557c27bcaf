//! Failure taxonomy for a single assessment request.
//!
//! Every variant collapses into the same `Failed` retrieval state; `kind()` only exists so
//! logs can tell a missing city apart from a broken transport.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// The service answered but flagged the city as unknown.
    #[error("service reported an error: {0}")]
    NotFound(String),
    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid service url: {0}")]
    Url(String),
    /// `.` and `..` are dot segments; URL normalization would drop them from the path.
    #[error("city {0:?} cannot be sent as a path segment")]
    DotSegment(String),
    #[error("request task aborted")]
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NotFound,
    Transport,
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::NotFound(_) => FailureKind::NotFound,
            _ => FailureKind::Transport,
        }
    }
}

//! Error types for the assessment client.

use thiserror::Error;

use crate::model::{AssignmentStatus, DisplayState};

/// Failures talking to the assessment service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The bearer token was rejected.
    #[error("authentication failed: {0}")]
    Unauthorized(String),

    /// The assessment (or its result) does not exist for this user.
    #[error("not found: {0}")]
    NotFound(String),

    /// The service answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Returns `true` if repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Timeout(_) | ApiError::Network(_) => true,
            ApiError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// A session command that was refused or failed.
///
/// Every variant is recoverable: the session stays usable and the command
/// may be retried once the condition is gone.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("assessment cannot be started while {state}")]
    NotAvailable { state: DisplayState },

    #[error("cannot {action} an assessment that is {status}")]
    InvalidTransition {
        action: &'static str,
        status: AssignmentStatus,
    },

    #[error("assessment window is closed")]
    OutsideWindow,

    #[error("{untouched} question(s) have no marked answer")]
    Incomplete { untouched: usize },

    #[error(transparent)]
    Api(#[from] ApiError),
}

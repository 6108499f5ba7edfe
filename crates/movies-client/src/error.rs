//! Error types for Movies API operations

use reqwest::StatusCode;
use std::fmt;
use thiserror::Error;

/// Why an operation unwound before producing a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The caller's cancellation token fired.
    Requested,
    /// A per-call deadline or the transport timeout elapsed.
    DeadlineElapsed,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requested => write!(f, "cancellation requested"),
            Self::DeadlineElapsed => write!(f, "deadline elapsed"),
        }
    }
}

/// Errors returned by Movies API operations
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API answered 401. Kept apart from `RequestFailed` so callers can
    /// re-authenticate.
    #[error("Access to the API was denied")]
    AccessDenied,

    #[error("Request failed with HTTP status: {status}")]
    RequestFailed { status: StatusCode },

    #[error("Operation cancelled: {0}")]
    Cancelled(CancelReason),

    #[error("Failed to decode response body: {0}")]
    DecodeFailed(#[source] serde_json::Error),

    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Invalid request: {0}")]
    Invalid(String),

    #[error("No client registered under name: {0}")]
    UnknownClient(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

impl ApiError {
    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::AccessDenied => Some(StatusCode::UNAUTHORIZED),
            Self::RequestFailed { status } => Some(*status),
            Self::Transport(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied)
    }

    /// True for both explicit cancellation and elapsed deadlines.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Cancelled(CancelReason::DeadlineElapsed)
        } else if let Some(status) = error.status() {
            Self::RequestFailed { status }
        } else {
            Self::Transport(error)
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(error: tokio::task::JoinError) -> Self {
        Self::TaskFailed(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_for_classified_errors() {
        assert_eq!(ApiError::AccessDenied.status(), Some(StatusCode::UNAUTHORIZED));
        assert_eq!(
            ApiError::RequestFailed {
                status: StatusCode::BAD_GATEWAY
            }
            .status(),
            Some(StatusCode::BAD_GATEWAY)
        );
        assert_eq!(
            ApiError::Cancelled(CancelReason::Requested).status(),
            None
        );
    }

    #[test]
    fn test_cancelled_is_distinct_from_request_failed() {
        let cancelled = ApiError::Cancelled(CancelReason::DeadlineElapsed);
        assert!(cancelled.is_cancelled());
        assert!(!cancelled.is_access_denied());

        let failed = ApiError::RequestFailed {
            status: StatusCode::INTERNAL_SERVER_ERROR,
        };
        assert!(!failed.is_cancelled());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            ApiError::Cancelled(CancelReason::Requested).to_string(),
            "Operation cancelled: cancellation requested"
        );
        assert_eq!(
            ApiError::RequestFailed {
                status: StatusCode::INTERNAL_SERVER_ERROR
            }
            .to_string(),
            "Request failed with HTTP status: 500 Internal Server Error"
        );
    }
}

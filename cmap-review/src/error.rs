//! Error types for cmap-review
//!
//! Every variant's `Display` is the message surfaced to the user.

use thiserror::Error;

/// Surfaced when an analyze request fails for any reason
pub const ANALYZE_FAILURE_MESSAGE: &str =
    "Could not reach the analysis service. Check that the backend is running.";

/// Surfaced when an update fails without a service-provided reason
pub const UPDATE_FAILURE_MESSAGE: &str = "Failed to update interests";

/// Client workflow error
#[derive(Debug, Error)]
pub enum ClientError {
    /// Guarded operation refused before any request was made
    #[error("{0}")]
    Validation(String),

    /// Same logical request already in flight
    #[error("{0}")]
    Busy(String),

    /// Operation not accepted in the current workflow state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Non-2xx status (`status` set) or transport failure (`status` unset)
    #[error("{message}")]
    Service {
        status: Option<u16>,
        message: String,
    },

    /// 2xx response whose body fails schema validation
    #[error("Malformed service response: {0}")]
    Decode(String),

    /// cmap-common error
    #[error(transparent)]
    Common(#[from] cmap_common::Error),
}

impl ClientError {
    /// HTTP status of a rejected request
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Service { status, .. } => *status,
            _ => None,
        }
    }

    /// Whether the error came from talking to the service
    pub fn is_service_failure(&self) -> bool {
        matches!(self, ClientError::Service { .. } | ClientError::Decode(_))
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

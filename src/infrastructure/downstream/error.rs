//! # Downstream Errors
//!
//! Error types for calls to the region, dealer and manufacturer providers.
//!
//! # Examples
//!
//! ```
//! use vehicle_offers::infrastructure::downstream::error::DownstreamError;
//!
//! let error = DownstreamError::not_found("region", "ZZ");
//! assert!(error.is_not_found());
//! assert_eq!(error.to_string(), "region not found: ZZ");
//!
//! let error = DownstreamError::timeout("price lookup timed out");
//! assert!(!error.is_not_found());
//! ```

use crate::infrastructure::concurrency::PoolError;
use thiserror::Error;

/// Error type for downstream provider calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownstreamError {
    /// The requested resource does not exist.
    #[error("{resource} not found: {id}")]
    NotFound {
        /// Resource kind.
        resource: String,
        /// Requested identifier.
        id: String,
    },

    /// The call did not complete in time.
    #[error("downstream timeout: {message}")]
    Timeout {
        /// Error message.
        message: String,
        /// Timeout duration in milliseconds.
        timeout_ms: Option<u64>,
    },

    /// Network or connection failure.
    #[error("downstream connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// The provider answered with an error status.
    #[error("downstream unavailable (status {status}): {message}")]
    Unavailable {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// The provider answered with a body that could not be decoded.
    #[error("invalid downstream response: {message}")]
    InvalidResponse {
        /// Error message.
        message: String,
    },

    /// The call was never issued because the worker pool refused it.
    #[error("downstream call rejected: {0}")]
    Rejected(#[source] PoolError),

    /// Internal failure while issuing the call.
    #[error("downstream internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl DownstreamError {
    /// Creates a not found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.to_string(),
        }
    }

    /// Creates a timeout error.
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
            timeout_ms: None,
        }
    }

    /// Creates a timeout error with duration.
    #[must_use]
    pub fn timeout_with_duration(message: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            message: message.into(),
            timeout_ms: Some(timeout_ms),
        }
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates an unavailable error for an HTTP status.
    #[must_use]
    pub fn unavailable(status: u16, message: impl Into<String>) -> Self {
        Self::Unavailable {
            status,
            message: message.into(),
        }
    }

    /// Creates an invalid response error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if the resource does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<PoolError> for DownstreamError {
    fn from(error: PoolError) -> Self {
        match error {
            PoolError::ShutDown | PoolError::Saturated { .. } => Self::Rejected(error),
            PoolError::TaskPanicked(message) => {
                Self::internal(format!("downstream call panicked: {message}"))
            }
            other => Self::internal(other.to_string()),
        }
    }
}

/// Result type for downstream calls.
pub type DownstreamResult<T> = Result<T, DownstreamError>;

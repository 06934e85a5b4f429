//! # Application Errors
//!
//! Error types for the application layer.
//!
//! Only fatal failures reach the caller. Recoverable downstream failures
//! (a failed price or discount lookup) are absorbed by the aggregation and
//! surface in logs and report counters instead.
//!
//! # Error Hierarchy
//!
//! ```text
//! ApplicationError
//! ├── Validation(String)        - Rejected before any downstream call
//! ├── NotFound                  - Unknown region or dealer
//! ├── UpstreamUnavailable       - Region, dealer list or dealer detail failed
//! └── Internal(String)          - Bugs and runtime failures
//! ```
//!
//! # Examples
//!
//! ```
//! use vehicle_offers::application::error::ApplicationError;
//! use vehicle_offers::infrastructure::downstream::DownstreamError;
//!
//! let err = ApplicationError::validation("maxResults must be between 0 and 20");
//! assert!(err.is_validation());
//!
//! let err = ApplicationError::from_downstream("region", DownstreamError::not_found("region", "ZZ"));
//! assert!(err.is_not_found());
//! ```

use crate::domain::errors::DomainError;
use crate::domain::value_objects::ParseEnumError;
use crate::infrastructure::downstream::error::DownstreamError;
use thiserror::Error;

/// Application layer error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplicationError {
    /// Request validation failed.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("not found: {resource_type} with id {id}")]
    NotFound {
        /// Type of resource.
        resource_type: String,
        /// Resource identifier.
        id: String,
    },

    /// A required upstream lookup failed.
    #[error("upstream unavailable: {resource} - {message}")]
    UpstreamUnavailable {
        /// Lookup that failed.
        resource: String,
        /// Error message.
        message: String,
    },

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a not found error.
    #[must_use]
    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Creates an upstream unavailable error.
    #[must_use]
    pub fn upstream_unavailable(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            resource: resource.into(),
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Converts a fatal downstream failure of `resource`.
    ///
    /// `NotFound` stays `NotFound`; everything else is `UpstreamUnavailable`.
    #[must_use]
    pub fn from_downstream(resource: &str, error: DownstreamError) -> Self {
        match error {
            DownstreamError::NotFound { resource, id } => Self::not_found(resource, id),
            other => Self::upstream_unavailable(resource, other.to_string()),
        }
    }

    /// Returns true if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if an upstream lookup failed.
    #[must_use]
    pub fn is_upstream_unavailable(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable { .. })
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

impl From<DomainError> for ApplicationError {
    fn from(error: DomainError) -> Self {
        Self::Validation(error.to_string())
    }
}

impl From<ParseEnumError> for ApplicationError {
    fn from(error: ParseEnumError) -> Self {
        Self::Validation(error.to_string())
    }
}

/// Result type for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

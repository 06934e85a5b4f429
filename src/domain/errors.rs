//! # Domain Errors
//!
//! Validation failures raised while constructing domain values.

use crate::domain::value_objects::enums::ParseEnumError;
use thiserror::Error;

/// Error raised when a domain invariant is violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Region code is empty, too long, or contains unsupported characters.
    #[error("invalid region code '{0}'")]
    InvalidRegionCode(String),

    /// Percentage outside `[0, 100]`.
    #[error("invalid percent {0}: must be within 0..=100")]
    InvalidPercent(i64),

    /// Result count outside the accepted bounds.
    #[error("max results {value} out of bounds 0..={limit}")]
    MaxResultsOutOfBounds {
        /// Requested value.
        value: i64,
        /// Upper bound.
        limit: usize,
    },

    /// Enum parse failure.
    #[error(transparent)]
    Parse(#[from] ParseEnumError),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_results_display() {
        let err = DomainError::MaxResultsOutOfBounds { value: 21, limit: 20 };
        assert_eq!(err.to_string(), "max results 21 out of bounds 0..=20");
    }

    #[test]
    fn parse_error_is_transparent() {
        let err: DomainError = ParseEnumError::InvalidValue("FullType", "x".to_string()).into();
        assert_eq!(err.to_string(), "invalid FullType value: 'x'");
    }
}

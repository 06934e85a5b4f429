//! # Checked Arithmetic
//!
//! Error type for integer price arithmetic.
//!
//! Prices are whole currency units held in `i64`. All price math goes
//! through checked operations and reports failures as [`ArithmeticError`]
//! rather than wrapping.

use thiserror::Error;

/// Error type for arithmetic operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ArithmeticError {
    /// Arithmetic operation resulted in overflow.
    #[error("arithmetic overflow")]
    Overflow,

    /// Arithmetic operation resulted in underflow.
    #[error("arithmetic underflow")]
    Underflow,

    /// Invalid value provided (e.g., negative when positive required).
    #[error("invalid value: {0}")]
    InvalidValue(&'static str),
}

/// Result type for arithmetic operations.
pub type ArithmeticResult<T> = Result<T, ArithmeticError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(ArithmeticError::Overflow.to_string(), "arithmetic overflow");
        assert_eq!(ArithmeticError::Underflow.to_string(), "arithmetic underflow");
        assert_eq!(
            ArithmeticError::InvalidValue("negative price").to_string(),
            "invalid value: negative price"
        );
    }
}

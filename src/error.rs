//! Error types for the anofox-characteristics library.

use thiserror::Error;

/// Result type alias for characteristics operations.
pub type Result<T> = std::result::Result<T, CharacteristicsError>;

/// Errors that can occur while extracting characteristics.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CharacteristicsError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Paired arrays have different lengths.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid option value passed to an algorithm.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// Input would divide by zero; only raised in strict mode.
    #[error("degenerate numeric input: {0}")]
    NumericDegenerate(String),
}

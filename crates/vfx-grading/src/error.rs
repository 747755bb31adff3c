//! Error types for grading operations.

use thiserror::Error;

/// Error type for grading operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradingError {
    /// The requested direction has no CPU implementation.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// A dynamic property was requested that this op does not expose.
    #[error("invalid dynamic property: {0}")]
    InvalidDynamicProperty(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Pixel buffer is shorter than the pixel count requires.
    #[error("buffer too small: expected at least {expected} floats, got {actual}")]
    BufferSize {
        /// Required number of floats (`4 * num_pixels`).
        expected: usize,
        /// Length of the buffer that was passed.
        actual: usize,
    },
}

/// Result type for grading operations.
pub type GradingResult<T> = Result<T, GradingError>;

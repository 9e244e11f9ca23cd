//! Error types for pmthits-core.

use thiserror::Error;

/// Result type alias for pmthits operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for hit record operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Positional access past the end of one of the record's sequences.
    #[error("{sequence} index {index} out of range (len {len})")]
    IndexOutOfRange {
        sequence: &'static str,
        index: usize,
        len: usize,
    },

    /// No arrival falls inside the requested window.
    #[error("no arrival in window [{low}, {high}]")]
    NotFound { low: f32, high: f32 },

    /// Window bounds are inverted or not comparable.
    #[error("invalid window: low {low} > high {high}")]
    InvalidWindow { low: f64, high: f64 },

    /// Configuration error.
    #[error("configuration error: {0}")]
    InvalidConfig(String),
}

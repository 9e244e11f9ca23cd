//! Collection error types.

use crate::collection::HitHandle;
use thiserror::Error;

/// Result type for collection operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Collection error types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Handle does not refer to a record of the current event.
    #[error("unknown hit handle: {0}")]
    UnknownHandle(HitHandle),

    /// No record for the sensor in the current event.
    #[error("no hits recorded for sensor {0}")]
    UnknownSensor(i32),

    /// Core library error.
    #[error("core error: {0}")]
    CoreError(#[from] pmthits_core::Error),
}

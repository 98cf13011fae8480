//! Error types for receiver timing.

use thiserror::Error;

/// A timing policy that cannot be scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TimingError {
    #[error("numberPerDay must be between 1 and 1440, got {0}")]
    NumberPerDay(i32),

    #[error("initialTime '{0}' is not a valid hh:mm time")]
    InitialTime(String),

    #[error("minDurationInSeconds must be at least 1 second, got {0}")]
    MinDuration(i64),

    #[error("next batch time is out of range for minDurationInSeconds {0}")]
    OutOfRange(i64),
}

/// Result type for scheduling operations.
pub type Result<T> = std::result::Result<T, TimingError>;

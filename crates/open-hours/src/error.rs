//! Error types for schedule parsing and queries.

use thiserror::Error;

use crate::hours::Kind;

#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Invalid clock time: {0}")]
    InvalidClock(String),

    #[error("Invalid clock range: {0}")]
    InvalidClockRange(String),

    #[error("Invalid timestamp: {0}")]
    InvalidStamp(String),

    #[error("Invalid timestamp range: {0}")]
    InvalidStampRange(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Unrecognized schedule: {0}")]
    UnrecognizedSchedule(String),

    #[error("Unsupported schedule kind: {0:?}")]
    UnsupportedKind(Kind),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;

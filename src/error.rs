use thiserror::Error;

/// Per-ride failures. These never escape a single worker's unit of work.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FareError {
    #[error("end timestamp {end} precedes start timestamp {start}")]
    InvalidTimestampOrder { start: i64, end: i64 },

    #[error("elapsed time between {start} and {end} does not fit in seconds")]
    ElapsedTimeOverflow { start: i64, end: i64 },

    #[error("not enough valid segments to price ride {ride_id:?}")]
    NotEnoughSegments { ride_id: Option<i64> },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("{0} channel closed before the pipeline finished")]
    ChannelClosed(&'static str),

    #[error("Worker failure: {0}")]
    Worker(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Worker(err.to_string())
    }
}

use thiserror::Error;

use crate::job::JobState;

/// Failures reported by a [`RemoteStore`](crate::store::RemoteStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Network or transport failure talking to the render API.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// No job with this id exists remotely.
    #[error("job not found: {0}")]
    NotFound(String),

    /// The store rejected the record as malformed.
    #[error("record rejected: {0}")]
    Validation(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: JobState, to: JobState },

    #[error("invalid job record: {0}")]
    Validation(String),

    #[error("job {0} was removed")]
    Removed(String),

    #[error("background sync needs a running tokio runtime")]
    NoRuntime,
}

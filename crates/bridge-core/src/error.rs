use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failures an index collaborator can report for a single query.
///
/// An empty result set is not an error; adapters return `Ok(vec![])` for it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("index unavailable: {0}")]
    Unavailable(String),

    #[error("index collection not provisioned: {0}")]
    NotProvisioned(String),

    #[error("index query timed out after {0:?}")]
    Timeout(Duration),
}

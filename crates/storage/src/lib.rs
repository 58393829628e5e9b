//! Prediction Log
//!
//! Keeps recent predictions in memory with a retention limit.

mod repository;

pub use repository::{PredictionRecord, Repository, DEFAULT_MAX_RECORDS};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Prediction log lock poisoned: {0}")]
    LockError(String),
    #[error("Retention limit must be greater than zero")]
    ZeroRetention,
}

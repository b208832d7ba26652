//! # Storage Errors
//!
//! Error types for the index store adapter and the profile store.
//! `NotFound` is a regular outcome callers branch on, never something
//! to log as a failure.

use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage adapter errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Key, bucket or object does not exist
    #[error("NOT_FOUND")]
    NotFound,

    /// Underlying driver failure
    #[error("storage failure: {0}")]
    Io(String),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

use thiserror::Error;

use crate::storage::StorageError;

/// Errors surfaced by index build, query and maintenance operations
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("NOT_FOUND")]
    NotFound,

    #[error("MANDATORY_IE_MISSING: [{0}]")]
    MandatoryIeMissing(String),

    #[error("broken reference to filter: {filter_id} for itemType: {item_type} and ID: {item_id}")]
    BrokenReference {
        filter_id: String,
        item_type: String,
        item_id: String,
    },

    #[error("WRONG_IDX_KEY_FORMAT<{0}>")]
    WrongIdxKeyFormat(String),

    #[error(transparent)]
    Filter(#[from] crate::filter::FilterError),

    #[error("{0}")]
    Storage(StorageError),
}

impl From<StorageError> for IndexError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => IndexError::NotFound,
            other => IndexError::Storage(other),
        }
    }
}

impl IndexError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, IndexError::NotFound)
    }
}

pub type IndexResult<T> = Result<T, IndexError>;

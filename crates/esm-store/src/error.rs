// ABOUTME: Error types shared by every record store backend.
// ABOUTME: Separates caller mistakes (InvalidArgument) from medium failures (StorageUnavailable).

use esm_core::{Collection, RecordId, ValidationError};
use thiserror::Error;

/// Underlying cause of a `StoreError::StorageUnavailable`.
#[derive(Debug, Error)]
pub enum StorageFault {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupt {collection} data: {reason}")]
    Corrupt {
        collection: Collection,
        reason: String,
    },

    #[error("store lock poisoned by a panicked writer")]
    Poisoned,
}

/// Errors returned by record store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ValidationError),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageFault),

    /// Reserved for lookup by id; no current operation returns it.
    #[error("{collection} record {id} not found")]
    NotFound {
        collection: Collection,
        id: RecordId,
    },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::StorageUnavailable(StorageFault::Sqlite(err))
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::StorageUnavailable(StorageFault::Io(err))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::StorageUnavailable(StorageFault::Json(err))
    }
}

impl StoreError {
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, StoreError::InvalidArgument(_))
    }

    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, StoreError::StorageUnavailable(_))
    }
}

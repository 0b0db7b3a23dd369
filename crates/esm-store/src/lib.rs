// ABOUTME: Persistence layer for esm: the RecordStore contract and its SQLite and document backends.
// ABOUTME: Also provides export aggregation and the StorageManager that writes export files.

pub mod atomic;
pub mod document;
pub mod error;
pub mod export;
pub mod manager;
pub mod sqlite;
pub mod store;

#[cfg(test)]
mod conformance;

pub use document::DocumentStore;
pub use error::{StorageFault, StoreError};
pub use export::build_export;
pub use manager::{ExportLayout, ManagerError, StorageManager};
pub use sqlite::SqliteStore;
pub use store::{Backend, RecordStore};

// ABOUTME: High-level storage manager for the esm home directory layout.
// ABOUTME: Opens the configured backend and writes export bundles as shareable JSON files.

use std::fs;
use std::path::{Path, PathBuf};

use esm_core::{Collection, ExportBundle};
use thiserror::Error;

use crate::atomic::write_atomic;
use crate::document::DocumentStore;
use crate::error::StoreError;
use crate::sqlite::SqliteStore;
use crate::store::{Backend, RecordStore};

/// Errors that can occur during storage management operations.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// How an export is laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportLayout {
    /// One `export_<epoch-millis>.json` file holding the whole bundle.
    #[default]
    Bundle,
    /// `sentiments.json`, `locations.json`, `vlogs.json` and `summary.json`
    /// in the export directory, replacing any previous split export.
    Split,
}

/// Manages the esm home directory:
///
/// ```text
/// <home>/esm.db          sqlite backend
/// <home>/collections/    document backend
/// <home>/data/           export artifacts
/// ```
pub struct StorageManager {
    home: PathBuf,
}

impl StorageManager {
    /// Create a new StorageManager rooted at `home`, creating it if needed.
    pub fn new(home: PathBuf) -> Result<Self, ManagerError> {
        fs::create_dir_all(&home)?;
        Ok(Self { home })
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn database_path(&self) -> PathBuf {
        self.home.join("esm.db")
    }

    pub fn collections_dir(&self) -> PathBuf {
        self.home.join("collections")
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.home.join("data")
    }

    /// Directory where captured clips are expected to live.
    pub fn vlogs_dir(&self) -> PathBuf {
        self.home.join("vlogs")
    }

    /// Open the record store for `backend` under this home directory.
    pub fn open_store(&self, backend: Backend) -> Result<Box<dyn RecordStore>, StoreError> {
        let store: Box<dyn RecordStore> = match backend {
            Backend::Sqlite => Box::new(SqliteStore::open(&self.database_path())?),
            Backend::Document => Box::new(DocumentStore::open(&self.collections_dir())?),
        };
        Ok(store)
    }

    /// Serialize `bundle` into the exports directory and return the path the
    /// user should share: the bundle file, or the directory for a split export.
    pub fn write_export(
        &self,
        bundle: &ExportBundle,
        layout: ExportLayout,
    ) -> Result<PathBuf, ManagerError> {
        let exports_dir = self.exports_dir();
        fs::create_dir_all(&exports_dir)?;

        let written = match layout {
            ExportLayout::Bundle => {
                let path = unused_export_path(&exports_dir, bundle.exported_at.timestamp_millis());
                write_atomic(&path, bundle.to_json_pretty()?.as_bytes())?;
                path
            }
            ExportLayout::Split => {
                let files = [
                    (
                        Collection::Sentiments,
                        serde_json::to_string_pretty(&bundle.sentiments)?,
                    ),
                    (
                        Collection::Locations,
                        serde_json::to_string_pretty(&bundle.locations)?,
                    ),
                    (
                        Collection::Vlogs,
                        serde_json::to_string_pretty(&bundle.vlogs)?,
                    ),
                ];
                for (collection, json) in files {
                    write_atomic(
                        &exports_dir.join(format!("{}.json", collection.key())),
                        json.as_bytes(),
                    )?;
                }
                let summary = serde_json::to_string_pretty(&bundle.summary_document())?;
                write_atomic(&exports_dir.join("summary.json"), summary.as_bytes())?;
                exports_dir
            }
        };

        tracing::info!(path = %written.display(), ?layout, "wrote export");
        Ok(written)
    }
}

/// `export_<millis>.json`, suffixed with a counter if that name is already taken.
fn unused_export_path(dir: &Path, millis: i64) -> PathBuf {
    let base = dir.join(format!("export_{millis}.json"));
    if !base.exists() {
        return base;
    }
    (1..)
        .map(|n| dir.join(format!("export_{millis}_{n}.json")))
        .find(|p| !p.exists())
        .unwrap_or(base)
}

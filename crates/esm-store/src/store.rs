// ABOUTME: The RecordStore trait every backend implements, plus backend selection.
// ABOUTME: Callers hold a store through this trait and never see backend-specific queries.

use std::fmt;
use std::str::FromStr;

use esm_core::{Counts, LocationRecord, SentimentRecord, VlogRecord};

use crate::error::StoreError;

/// Durable, typed, ordered persistence for the three record kinds.
///
/// Inserts validate first and write nothing on rejection. The store assigns
/// `id` and `created_at` in the same critical section as the write, so two
/// concurrent inserts into one collection never share an id. List calls
/// return the whole collection newest first.
pub trait RecordStore: Send + Sync {
    fn backend(&self) -> Backend;

    fn insert_sentiment(
        &self,
        mood: i64,
        energy: i64,
        stress: i64,
    ) -> Result<SentimentRecord, StoreError>;

    fn insert_location(&self, latitude: f64, longitude: f64)
    -> Result<LocationRecord, StoreError>;

    fn insert_vlog(&self, file_path: &str) -> Result<VlogRecord, StoreError>;

    fn list_sentiments(&self) -> Result<Vec<SentimentRecord>, StoreError>;

    fn list_locations(&self) -> Result<Vec<LocationRecord>, StoreError>;

    fn list_vlogs(&self) -> Result<Vec<VlogRecord>, StoreError>;

    /// Remove every record from every collection. Ids are not reused afterwards.
    fn clear_all(&self) -> Result<(), StoreError>;

    /// Per-collection record counts.
    fn counts(&self) -> Result<Counts, StoreError> {
        Ok(Counts {
            sentiments: self.list_sentiments()?.len(),
            locations: self.list_locations()?.len(),
            vlogs: self.list_vlogs()?.len(),
        })
    }
}

/// Which concrete backend holds the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Embedded SQLite database, one table per collection.
    #[default]
    Sqlite,
    /// One JSON document per collection key.
    Document,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Sqlite => f.write_str("sqlite"),
            Backend::Document => f.write_str("document"),
        }
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "sql" => Ok(Backend::Sqlite),
            "document" | "json" | "kv" => Ok(Backend::Document),
            other => Err(format!("unknown backend: {other} (expected sqlite or document)")),
        }
    }
}

// ABOUTME: Key-value document record store: one JSON document per collection key.
// ABOUTME: Each insert is a locked read-modify-write that replaces the document atomically.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use esm_core::{
    Collection, LocationInput, LocationRecord, Record, RecordId, SentimentInput,
    SentimentRecord, VlogInput, VlogRecord, now_micros, sort_newest_first,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::atomic::write_atomic;
use crate::error::{StorageFault, StoreError};
use crate::store::{Backend, RecordStore};

/// On-disk shape of one collection: the id counter and its records, newest first.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollectionDocument<T> {
    next_id: RecordId,
    records: Vec<T>,
}

impl<T> CollectionDocument<T> {
    fn empty() -> Self {
        Self {
            next_id: 1,
            records: Vec::new(),
        }
    }
}

/// A record store keeping each collection as a JSON document under one directory.
///
/// The id counter lives in the document and survives `clear_all`, so ids are
/// never reused.
pub struct DocumentStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl DocumentStore {
    /// Open or create a document store in `dir`. Missing collection documents
    /// are created empty; existing ones are checked and left as they are.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir)?;

        let store = Self {
            dir: dir.to_path_buf(),
            lock: Mutex::new(()),
        };

        {
            let _guard = store.lock()?;
            for collection in Collection::ALL {
                store.ensure_document(collection)?;
            }
        }

        tracing::info!(dir = %dir.display(), "opened document record store");
        Ok(store)
    }

    /// Directory holding the collection documents.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document backing one collection.
    pub fn document_path(&self, collection: Collection) -> PathBuf {
        self.dir.join(format!("{}.json", collection.key()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.lock
            .lock()
            .map_err(|_| StoreError::StorageUnavailable(StorageFault::Poisoned))
    }

    fn ensure_document(&self, collection: Collection) -> Result<(), StoreError> {
        if self.document_path(collection).exists() {
            // Fail open() on a document that no longer parses.
            self.load::<serde_json::Value>(collection)?;
            return Ok(());
        }
        self.save(collection, &CollectionDocument::<serde_json::Value>::empty())
    }

    fn load<T: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> Result<CollectionDocument<T>, StoreError> {
        let path = self.document_path(collection);
        match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                StoreError::StorageUnavailable(StorageFault::Corrupt {
                    collection,
                    reason: e.to_string(),
                })
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(%collection, path = %path.display(), "collection document missing, treating as empty");
                Ok(CollectionDocument::empty())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save<T: Serialize>(
        &self,
        collection: Collection,
        doc: &CollectionDocument<T>,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_vec(doc)?;
        write_atomic(&self.document_path(collection), &json)?;
        Ok(())
    }

    /// Allocate the next id, build the record, and persist it at the head of the document.
    fn append<T>(
        &self,
        collection: Collection,
        build: impl FnOnce(RecordId) -> T,
    ) -> Result<T, StoreError>
    where
        T: Record + Clone + Serialize + DeserializeOwned,
    {
        let _guard = self.lock()?;
        let mut doc = self.load::<T>(collection)?;

        let max_existing = doc.records.iter().map(Record::id).max().unwrap_or(0);
        let id = doc.next_id.max(max_existing + 1);
        let record = build(id);

        doc.next_id = id + 1;
        doc.records.insert(0, record.clone());
        self.save(collection, &doc)?;

        tracing::debug!(%collection, id, "inserted record");
        Ok(record)
    }

    fn list<T>(&self, collection: Collection) -> Result<Vec<T>, StoreError>
    where
        T: Record + DeserializeOwned,
    {
        let _guard = self.lock()?;
        let mut records = self.load::<T>(collection)?.records;
        sort_newest_first(&mut records);
        Ok(records)
    }
}

impl RecordStore for DocumentStore {
    fn backend(&self) -> Backend {
        Backend::Document
    }

    fn insert_sentiment(
        &self,
        mood: i64,
        energy: i64,
        stress: i64,
    ) -> Result<SentimentRecord, StoreError> {
        let input = SentimentInput::new(mood, energy, stress)?;
        self.append(Collection::Sentiments, |id| {
            input.into_record(id, now_micros())
        })
    }

    fn insert_location(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<LocationRecord, StoreError> {
        let input = LocationInput::new(latitude, longitude)?;
        self.append(Collection::Locations, |id| {
            input.into_record(id, now_micros())
        })
    }

    fn insert_vlog(&self, file_path: &str) -> Result<VlogRecord, StoreError> {
        let input = VlogInput::new(file_path)?;
        self.append(Collection::Vlogs, |id| input.into_record(id, now_micros()))
    }

    fn list_sentiments(&self) -> Result<Vec<SentimentRecord>, StoreError> {
        self.list(Collection::Sentiments)
    }

    fn list_locations(&self) -> Result<Vec<LocationRecord>, StoreError> {
        self.list(Collection::Locations)
    }

    fn list_vlogs(&self) -> Result<Vec<VlogRecord>, StoreError> {
        self.list(Collection::Vlogs)
    }

    /// Empty every collection, keeping each id counter past every id it has issued.
    ///
    /// All documents are read and serialized before any is replaced, so an
    /// unreadable collection leaves every document untouched. A failed write
    /// part-way through can still leave earlier collections cleared.
    fn clear_all(&self) -> Result<(), StoreError> {
        let _guard = self.lock()?;

        let mut cleared = Vec::with_capacity(Collection::ALL.len());
        for collection in Collection::ALL {
            let doc = self.load::<serde_json::Value>(collection)?;
            let max_existing = doc
                .records
                .iter()
                .filter_map(|r| r.get("id").and_then(serde_json::Value::as_i64))
                .max()
                .unwrap_or(0);
            let empty = CollectionDocument::<serde_json::Value> {
                next_id: doc.next_id.max(max_existing + 1),
                records: Vec::new(),
            };
            cleared.push((collection, serde_json::to_vec(&empty)?));
        }

        for (collection, json) in cleared {
            write_atomic(&self.document_path(collection), &json)?;
        }
        tracing::info!(dir = %self.dir.display(), "cleared all document collections");
        Ok(())
    }
}

// ABOUTME: SQLite-backed record store with one AUTOINCREMENT table per collection.
// ABOUTME: A single connection behind a mutex serializes writes; each insert runs in a transaction.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use esm_core::record::format_timestamp;
use esm_core::{
    Collection, Counts, LocationInput, LocationRecord, SentimentInput, SentimentRecord,
    VlogInput, VlogRecord, now_micros,
};
use rusqlite::types::Type;
use rusqlite::{Connection, Row, params};

use crate::error::{StorageFault, StoreError};
use crate::store::{Backend, RecordStore};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS sentiments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        mood INTEGER NOT NULL CHECK (mood BETWEEN 1 AND 5),
        energy INTEGER NOT NULL CHECK (energy BETWEEN 1 AND 5),
        stress INTEGER NOT NULL CHECK (stress BETWEEN 1 AND 5),
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS locations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS vlogs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        file_path TEXT NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_sentiments_created ON sentiments(created_at);
    CREATE INDEX IF NOT EXISTS idx_locations_created ON locations(created_at);
    CREATE INDEX IF NOT EXISTS idx_vlogs_created ON vlogs(created_at);
";

/// A record store persisted in a single SQLite database file.
///
/// `AUTOINCREMENT` keeps ids monotonic across `clear_all`, so a cleared
/// store never hands out an id that belonged to a removed record.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open or create a database at the given path and ensure the three
    /// tables exist. Safe to call on every start; existing rows are untouched.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::init_schema(&conn)?;

        tracing::info!(path = %path.display(), "opened sqlite record store");

        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// Path of the database file, or None for an in-memory store.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn init_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::StorageUnavailable(StorageFault::Poisoned))
    }

    /// Run one INSERT inside a transaction and return the assigned rowid with its timestamp.
    ///
    /// `created_at` is read under the connection lock and bound as the last
    /// parameter, so id order and timestamp order agree across threads.
    fn insert_row(
        &self,
        collection: Collection,
        sql: &str,
        values: &[&dyn rusqlite::ToSql],
    ) -> Result<(i64, DateTime<Utc>), StoreError> {
        let mut conn = self.lock()?;
        let created_at = now_micros();
        let stamp = format_timestamp(&created_at);
        let mut bound: Vec<&dyn rusqlite::ToSql> = values.to_vec();
        bound.push(&stamp);

        let tx = conn.transaction()?;
        tx.execute(sql, bound.as_slice())?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        tracing::debug!(%collection, id, "inserted record");
        Ok((id, created_at))
    }

    fn list_rows<T>(
        &self,
        sql: &str,
        map: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([], map)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    fn count(conn: &Connection, collection: Collection) -> Result<usize, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {}", collection.key());
        let n: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

/// Read a created_at column, surfacing unparseable text as a conversion error.
fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

impl RecordStore for SqliteStore {
    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    fn insert_sentiment(
        &self,
        mood: i64,
        energy: i64,
        stress: i64,
    ) -> Result<SentimentRecord, StoreError> {
        let input = SentimentInput::new(mood, energy, stress)?;
        let (id, created_at) = self.insert_row(
            Collection::Sentiments,
            "INSERT INTO sentiments (mood, energy, stress, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![input.mood, input.energy, input.stress],
        )?;
        Ok(input.into_record(id, created_at))
    }

    fn insert_location(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<LocationRecord, StoreError> {
        let input = LocationInput::new(latitude, longitude)?;
        let (id, created_at) = self.insert_row(
            Collection::Locations,
            "INSERT INTO locations (latitude, longitude, created_at) VALUES (?1, ?2, ?3)",
            params![input.latitude, input.longitude],
        )?;
        Ok(input.into_record(id, created_at))
    }

    fn insert_vlog(&self, file_path: &str) -> Result<VlogRecord, StoreError> {
        let input = VlogInput::new(file_path)?;
        let (id, created_at) = self.insert_row(
            Collection::Vlogs,
            "INSERT INTO vlogs (file_path, created_at) VALUES (?1, ?2)",
            params![input.file_path],
        )?;
        Ok(input.into_record(id, created_at))
    }

    fn list_sentiments(&self) -> Result<Vec<SentimentRecord>, StoreError> {
        self.list_rows(
            "SELECT id, mood, energy, stress, created_at FROM sentiments
             ORDER BY created_at DESC, id DESC",
            |row| {
                Ok(SentimentRecord {
                    id: row.get(0)?,
                    mood: row.get(1)?,
                    energy: row.get(2)?,
                    stress: row.get(3)?,
                    created_at: timestamp_column(row, 4)?,
                })
            },
        )
    }

    fn list_locations(&self) -> Result<Vec<LocationRecord>, StoreError> {
        self.list_rows(
            "SELECT id, latitude, longitude, created_at FROM locations
             ORDER BY created_at DESC, id DESC",
            |row| {
                Ok(LocationRecord {
                    id: row.get(0)?,
                    latitude: row.get(1)?,
                    longitude: row.get(2)?,
                    created_at: timestamp_column(row, 3)?,
                })
            },
        )
    }

    fn list_vlogs(&self) -> Result<Vec<VlogRecord>, StoreError> {
        self.list_rows(
            "SELECT id, file_path, created_at FROM vlogs
             ORDER BY created_at DESC, id DESC",
            |row| {
                Ok(VlogRecord {
                    id: row.get(0)?,
                    file_path: row.get(1)?,
                    created_at: timestamp_column(row, 2)?,
                })
            },
        )
    }

    fn clear_all(&self) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for collection in Collection::ALL {
            tx.execute(&format!("DELETE FROM {}", collection.key()), [])?;
        }
        tx.commit()?;
        tracing::info!("cleared all sqlite collections");
        Ok(())
    }

    fn counts(&self) -> Result<Counts, StoreError> {
        let conn = self.lock()?;
        Ok(Counts {
            sentiments: Self::count(&conn, Collection::Sentiments)?,
            locations: Self::count(&conn, Collection::Locations)?,
            vlogs: Self::count(&conn, Collection::Vlogs)?,
        })
    }
}

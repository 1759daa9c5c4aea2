//! Whole-document persistence for users and attendance records.
//!
//! Every call reads or rewrites a complete collection. There is no locking:
//! two writers racing on the same collection lose one update.

mod file;
mod memory;

use std::sync::Arc;

use anyhow::Context;
use serde::{Serialize, de::DeserializeOwned};
use strum_macros::Display;
use thiserror::Error;

use crate::config::Config;

pub use file::FileBackend;
pub use memory::MemoryBackend;

pub const MEMORY_DIR: &str = ":memory:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Collection {
    Users,
    Attendance,
    /// CSV report artifact, not JSON
    Report,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{collection} is not a valid JSON array: {source}")]
    Corrupt {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },
}

/// Raw document access. `read` returns `None` when the document was never written.
pub trait StorageBackend: Send + Sync {
    fn read(&self, collection: Collection) -> Result<Option<String>, StoreError>;
    fn write(&self, collection: Collection, contents: &str) -> Result<(), StoreError>;
}

/// Typed load / save_all over any backend.
#[derive(Clone)]
pub struct RecordStore {
    backend: Arc<dyn StorageBackend>,
}

impl RecordStore {
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::default())
    }

    pub fn load<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>, StoreError> {
        match self.backend.read(collection)? {
            None => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|source| StoreError::Corrupt { collection, source }),
        }
    }

    pub fn save_all<T: Serialize>(
        &self,
        collection: Collection,
        records: &[T],
    ) -> Result<(), StoreError> {
        let raw = serde_json::to_string(records)
            .map_err(|source| StoreError::Corrupt { collection, source })?;
        self.backend.write(collection, &raw)?;
        log::debug!("Saved {} records to {}", records.len(), collection);
        Ok(())
    }

    pub fn write_report(&self, csv: &str) -> Result<(), StoreError> {
        self.backend.write(Collection::Report, csv)
    }

    #[cfg(test)]
    pub fn read_report(&self) -> Result<Option<String>, StoreError> {
        self.backend.read(Collection::Report)
    }
}

/// Builds the store described by the config. `DATA_DIR=:memory:` keeps
/// everything in process memory.
pub fn init_store(config: &Config) -> anyhow::Result<RecordStore> {
    if config.data_dir.as_os_str() == MEMORY_DIR {
        log::warn!("DATA_DIR is {MEMORY_DIR}; records will not survive a restart");
        return Ok(RecordStore::in_memory());
    }

    let backend = FileBackend::new(&config.data_dir)
        .with_file(Collection::Users, &config.users_file)
        .with_file(Collection::Attendance, &config.attendance_file)
        .with_file(Collection::Report, &config.report_file);

    backend
        .ensure_dir()
        .with_context(|| format!("cannot create data dir {}", config.data_dir.display()))?;

    Ok(RecordStore::new(backend))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::{AttendanceRecord, EventKind};

    fn record(name: &str) -> AttendanceRecord {
        AttendanceRecord {
            name: name.to_string(),
            date: "2024-01-01".to_string(),
            now: "09:00".to_string(),
            kind: EventKind::In,
            lat: 25.58883,
            lng: 56.26589,
            distance: 0,
        }
    }

    #[test]
    fn missing_collection_loads_empty() {
        let store = RecordStore::in_memory();
        let records: Vec<AttendanceRecord> = store.load(Collection::Attendance).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn save_all_overwrites_the_whole_collection() {
        let store = RecordStore::in_memory();
        store
            .save_all(Collection::Attendance, &[record("A"), record("B")])
            .unwrap();
        store.save_all(Collection::Attendance, &[record("C")]).unwrap();

        let records: Vec<AttendanceRecord> = store.load(Collection::Attendance).unwrap();
        assert_eq!(records, vec![record("C")]);
    }

    #[test]
    fn invalid_json_is_reported_as_corrupt() {
        let backend = MemoryBackend::default();
        backend.write(Collection::Users, "{not json").unwrap();
        let store = RecordStore::new(backend);

        let err = store.load::<serde_json::Value>(Collection::Users).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Corrupt {
                collection: Collection::Users,
                ..
            }
        ));
        assert!(err.to_string().starts_with("users is not a valid JSON array"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn io_errors_convert_with_their_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err = StoreError::from(io);
        assert_eq!(err.to_string(), "storage io error: read-only");
        assert!(matches!(err, StoreError::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn memory_dir_selects_the_memory_backend() {
        let mut config = Config::default();
        config.data_dir = MEMORY_DIR.into();
        let store = init_store(&config).unwrap();

        store.save_all(Collection::Users, &[serde_json::json!({"email": "a"})]).unwrap();
        assert!(!std::path::Path::new(MEMORY_DIR).exists());
    }

    #[test]
    fn file_store_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.data_dir = dir.path().join("nested");
        let store = init_store(&config).unwrap();

        store.save_all(Collection::Attendance, &[record("A")]).unwrap();
        assert!(dir.path().join("nested").join("attendance.json").exists());

        let reopened = init_store(&config).unwrap();
        let records: Vec<AttendanceRecord> = reopened.load(Collection::Attendance).unwrap();
        assert_eq!(records, vec![record("A")]);
    }
}

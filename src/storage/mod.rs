use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::LineItem;

#[cfg(test)]
pub mod memory;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed for {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("stored records for {key} are not valid JSON: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode records: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Synchronous string key/value storage. Every call completes before it
/// returns.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// One file per key inside a directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { key: key.to_string(), source }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let io_err = |source| StorageError::Io { key: key.to_string(), source };

        fs::write(&tmp, value).map_err(io_err)?;
        fs::rename(&tmp, &path).map_err(io_err)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { key: key.to_string(), source }),
        }
    }
}

pub fn records_key(date: NaiveDate) -> String {
    format!("records:{}", date.format("%Y-%m-%d"))
}

/// Day ledgers stored as JSON arrays under `records:<date>`.
pub struct LedgerStorage {
    store: Box<dyn KeyValueStore>,
}

impl LedgerStorage {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self { store: Box::new(store) }
    }

    pub fn load(&self, date: NaiveDate) -> Result<Option<Vec<LineItem>>, StorageError> {
        let key = records_key(date);
        let Some(raw) = self.store.get(&key)? else {
            debug!(%key, "no local records");
            return Ok(None);
        };

        let rows: Vec<LineItem> = serde_json::from_str(&raw).map_err(|source| {
            warn!(%key, error = %source, "unreadable local records");
            StorageError::Decode { key: key.clone(), source }
        })?;
        debug!(%key, count = rows.len(), "loaded local records");
        Ok(Some(rows))
    }

    pub fn save(&mut self, date: NaiveDate, rows: &[LineItem]) -> Result<(), StorageError> {
        let json = serde_json::to_string(rows)?;
        self.store.set(&records_key(date), &json)
    }

    pub fn erase(&mut self, date: NaiveDate) -> Result<(), StorageError> {
        self.store.remove(&records_key(date))
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryStore;
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn key_scheme() {
        assert_eq!(records_key(date()), "records:2024-03-09");
    }

    #[test]
    fn save_then_load_reproduces_rows() {
        let mut storage = LedgerStorage::new(MemoryStore::new());
        let mut first = LineItem::empty();
        first.name = "Priya Sharma".to_string();
        first.include_lab = true;
        first.test_fee = "300".to_string();
        first.synced = true;
        first.version = 4;
        let rows = vec![first, LineItem::empty()];

        storage.save(date(), &rows).unwrap();
        assert_eq!(storage.load(date()).unwrap(), Some(rows));
    }

    #[test]
    fn missing_date_loads_none() {
        let storage = LedgerStorage::new(MemoryStore::new());
        assert_eq!(storage.load(date()).unwrap(), None);
    }

    #[test]
    fn file_store_round_trip_and_erase() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = LedgerStorage::new(FileStore::new(dir.path()).unwrap());
        let rows = vec![LineItem::empty()];

        storage.save(date(), &rows).unwrap();
        assert!(dir.path().join("records_2024-03-09.json").exists());
        assert_eq!(storage.load(date()).unwrap(), Some(rows));

        storage.erase(date()).unwrap();
        assert_eq!(storage.load(date()).unwrap(), None);
        storage.erase(date()).unwrap();
    }

    #[test]
    fn read_only_store_rejects_writes() {
        let store = MemoryStore::new();
        store.set_read_only(true);
        let mut storage = LedgerStorage::new(store.clone());

        assert!(matches!(storage.save(date(), &[LineItem::empty()]), Err(StorageError::Io { .. })));
        store.set_read_only(false);
        storage.save(date(), &[LineItem::empty()]).unwrap();
    }

    #[test]
    fn corrupt_document_is_a_decode_error() {
        let mut store = MemoryStore::new();
        store.set(&records_key(date()), "{not json").unwrap();
        let storage = LedgerStorage::new(store);

        assert!(matches!(storage.load(date()), Err(StorageError::Decode { .. })));
    }
}

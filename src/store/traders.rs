//! Registered trader store.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// One registered trader as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TraderRecord {
    pub name: String,
    pub account: String,
}

/// On-disk shape of the trader file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TradersFile {
    pub traders: Vec<TraderRecord>,
}

/// In-memory snapshot of the trader file.
///
/// Unlike keys and users, this store also writes: registrations append a
/// record and persist the whole file. The write lock serializes
/// concurrent read-modify-write cycles; readers stay lock-free.
pub struct TraderStore {
    inner: ArcSwap<TradersFile>,
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl TraderStore {
    /// Load the trader file. A missing file starts an empty store; the
    /// file is created on first registration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let traders = if path.exists() {
            read_traders_file(&path)?
        } else {
            TradersFile::default()
        };
        tracing::info!(count = traders.traders.len(), path = %path.display(), "Loaded traders");
        Ok(Self {
            inner: ArcSwap::from_pointee(traders),
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn list(&self) -> Vec<TraderRecord> {
        self.inner.load().traders.clone()
    }

    pub fn count(&self) -> usize {
        self.inner.load().traders.len()
    }

    /// Register a trader: persist to disk first, then swap the snapshot.
    pub fn add(&self, record: TraderRecord) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().expect("trader store mutex poisoned");

        let mut next = self.inner.load().as_ref().clone();
        next.traders.push(record);
        write_traders_file(&self.path, &next)?;
        self.inner.store(Arc::new(next));
        Ok(())
    }

    /// Re-read the file from disk and atomically swap the snapshot.
    pub fn reload(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().expect("trader store mutex poisoned");

        let traders = if self.path.exists() {
            read_traders_file(&self.path)?
        } else {
            TradersFile::default()
        };
        tracing::info!(count = traders.traders.len(), "Reloaded traders");
        self.inner.store(Arc::new(traders));
        Ok(())
    }
}

fn read_traders_file(path: &Path) -> Result<TradersFile, StoreError> {
    let file = File::open(path).map_err(|e| StoreError::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| StoreError::parse(path, e))
}

fn write_traders_file(path: &Path, traders: &TradersFile) -> Result<(), StoreError> {
    let file = File::create(path).map_err(|e| StoreError::io(path, e))?;
    serde_json::to_writer_pretty(BufWriter::new(file), traders)
        .map_err(|e| StoreError::parse(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("signal-gateway-trader-tests");
        fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let path = temp_path("traders_missing.json");
        fs::remove_file(&path).unwrap_or_default();

        let store = TraderStore::load(&path).unwrap();
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_add_persists_and_reload_round_trips() {
        let path = temp_path("traders_add.json");
        fs::remove_file(&path).unwrap_or_default();

        let store = TraderStore::load(&path).unwrap();
        store
            .add(TraderRecord {
                name: "alice".to_string(),
                account: "ACC-1".to_string(),
            })
            .unwrap();
        assert_eq!(store.count(), 1);

        // A fresh store sees the persisted record.
        let reopened = TraderStore::load(&path).unwrap();
        assert_eq!(reopened.list(), store.list());

        fs::remove_file(path).unwrap_or_default();
    }
}

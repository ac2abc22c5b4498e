//! License key store.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::store::StoreError;

/// On-disk shape of the key file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KeysFile {
    #[serde(rename = "validKeys")]
    pub valid_keys: Vec<String>,
}

/// In-memory snapshot of the license key file.
///
/// Reads go through ArcSwap, so verification never blocks on a reload.
#[derive(Debug)]
pub struct KeyStore {
    inner: ArcSwap<KeysFile>,
    path: PathBuf,
}

impl KeyStore {
    /// Load the key file. Missing or malformed files are an error: a
    /// gateway without keys cannot verify anything.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let keys = read_keys_file(&path)?;
        tracing::info!(count = keys.valid_keys.len(), path = %path.display(), "Loaded license keys");
        Ok(Self {
            inner: ArcSwap::from_pointee(keys),
            path,
        })
    }

    /// Check a key for membership. The caller is expected to have
    /// trimmed client-supplied whitespace already.
    pub fn is_valid(&self, key: &str) -> bool {
        self.inner.load().valid_keys.iter().any(|k| k == key)
    }

    pub fn count(&self) -> usize {
        self.inner.load().valid_keys.len()
    }

    /// Re-read the file from disk and atomically swap the snapshot.
    pub fn reload(&self) -> Result<(), StoreError> {
        let keys = read_keys_file(&self.path)?;
        tracing::info!(count = keys.valid_keys.len(), "Reloaded license keys");
        self.inner.store(Arc::new(keys));
        Ok(())
    }
}

fn read_keys_file(path: &Path) -> Result<KeysFile, StoreError> {
    let file = File::open(path).map_err(|e| StoreError::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| StoreError::parse(path, e))
}

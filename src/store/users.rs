//! User credential store.
//!
//! Credentials live in a flat JSON file and are matched verbatim; this
//! mirrors the licensing service this gateway fronts. Hashing is out of
//! scope here.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// One user record as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    pub username: String,
    pub password: String,
}

/// On-disk shape of the user file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UsersFile {
    pub users: Vec<UserRecord>,
}

/// In-memory snapshot of the user file.
pub struct UserStore {
    inner: ArcSwap<UsersFile>,
    path: PathBuf,
}

impl UserStore {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let users = read_users_file(&path)?;
        tracing::info!(count = users.users.len(), path = %path.display(), "Loaded users");
        Ok(Self {
            inner: ArcSwap::from_pointee(users),
            path,
        })
    }

    /// Exact username+password match. Returns the matched record.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<UserRecord> {
        self.inner
            .load()
            .users
            .iter()
            .find(|u| u.username == username && u.password == password)
            .cloned()
    }

    pub fn count(&self) -> usize {
        self.inner.load().users.len()
    }

    /// Re-read the file from disk and atomically swap the snapshot.
    pub fn reload(&self) -> Result<(), StoreError> {
        let users = read_users_file(&self.path)?;
        tracing::info!(count = users.users.len(), "Reloaded users");
        self.inner.store(Arc::new(users));
        Ok(())
    }
}

fn read_users_file(path: &Path) -> Result<UsersFile, StoreError> {
    let file = File::open(path).map_err(|e| StoreError::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| StoreError::parse(path, e))
}

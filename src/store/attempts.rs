//! Login attempt log.
//!
//! Append-only JSON lines, one object per attempt. The log exists for
//! operators to grep, not for the service to read back.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// One recorded login attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub username: String,
    pub success: bool,
    pub client: String,
    pub timestamp: String,
}

impl AttemptRecord {
    pub fn new(username: &str, success: bool, client: &str) -> Self {
        Self {
            username: username.to_string(),
            success,
            client: client.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Append-only attempt log with a single open file handle.
pub struct AttemptLog {
    file: Mutex<File>,
    path: PathBuf,
}

impl AttemptLog {
    /// Open (or create) the log for appending.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StoreError::io(&path, e))?;
        Ok(Self {
            file: Mutex::new(file),
            path,
        })
    }

    /// Append one attempt as a JSON line.
    pub fn record(&self, attempt: &AttemptRecord) -> Result<(), StoreError> {
        let line = serde_json::to_string(attempt).map_err(|e| StoreError::parse(&self.path, e))?;
        let mut file = self.file.lock().expect("attempt log mutex poisoned");
        writeln!(file, "{}", line).map_err(|e| StoreError::io(&self.path, e))
    }
}

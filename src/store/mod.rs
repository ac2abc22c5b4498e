//! Flat-file persistence subsystem.
//!
//! # Data Flow
//! ```text
//! keys.json / users.json / traders.json
//!     → loaded at startup (serde_json over BufReader)
//!     → held behind ArcSwap for lock-free reads
//!     → swapped atomically on POST /reload-data
//!
//! login attempts
//!     → attempts.rs (append-only JSON lines)
//! ```
//!
//! # Design Decisions
//! - Files are the source of truth; the in-memory copy is a snapshot
//! - Reload replaces the whole snapshot, never patches it
//! - Keys and users are required at startup; traders default to empty

use thiserror::Error;

pub mod attempts;
pub mod keys;
pub mod traders;
pub mod users;

pub use attempts::{AttemptLog, AttemptRecord};
pub use keys::KeyStore;
pub use traders::{TraderRecord, TraderStore};
pub use users::{UserRecord, UserStore};

/// Errors raised by the flat-file stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// File could not be read or written.
    #[error("failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// File contents are not the expected JSON shape.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub(crate) fn parse(path: &std::path::Path, source: serde_json::Error) -> Self {
        Self::Parse {
            path: path.display().to_string(),
            source,
        }
    }
}

//! Error types for the persistence layer.

use thiserror::Error;

/// Failure to read or write the local session store.
///
/// Widget-facing operations never return these; the session store logs and
/// swallows them so the host page keeps working with the in-memory record.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("session record could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

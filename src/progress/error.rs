//! Storage-specific error types.

use std::path::PathBuf;

/// Errors that can occur while reading or writing progress snapshots.
///
/// These never escape to navigation or submission paths; the store logs
/// them and degrades to "no saved progress".
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Failed to find home directory
    #[error("Failed to find home directory")]
    HomeDirectoryNotFound,

    /// Failed to create the storage directory
    #[error("Failed to create storage directory {path}: {source}")]
    CreateDirectoryFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write a storage slot
    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to read a storage slot
    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to remove a storage slot
    #[error("Failed to remove {path}: {source}")]
    RemoveFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to serialize a progress snapshot
    #[error("Failed to serialize progress snapshot: {0}")]
    SerializationFailed(String),
}

//! Durable form progress persistence.
//!
//! One named slot holds a JSON snapshot of the session (step, answers,
//! submission reference, timestamp), overwritten on every save. Storage is
//! abstracted behind `StorageBackend` so sessions can persist to disk in
//! production and to memory in tests; a backend reports failure by return
//! value and never panics. Malformed stored data is discarded whole:
//! loading degrades to "no progress found" rather than partially applying
//! a snapshot.

mod autosave;
mod error;

pub use autosave::{Autosaver, DEFAULT_AUTOSAVE_INTERVAL};
pub use error::StorageError;

use crate::form::{AnswerMap, FormSession};
use chrono::{DateTime, Utc};
use log::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::{fs, io::Write};

/// Storage slot holding the in-progress report.
///
pub const PROGRESS_KEY: &str = "meyousafe_form_progress";

const DEFAULT_DIRECTORY_PATH: &str = ".config/meyousafe";

/// Snapshot of a form session written to durable storage.
///
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersistedProgress {
    pub current_step: usize,
    pub form_data: AnswerMap,
    pub report_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Key-value storage medium for progress snapshots.
///
/// Implementations report failure by return value; callers degrade
/// gracefully instead of handling errors.
pub trait StorageBackend: Send + Sync {
    /// Return the stored value for a key, or none if absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;

    /// Store a value, overwriting any prior one. Returns false on failure.
    fn set(&self, key: &str, value: &str) -> bool;

    /// Remove a key. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> bool;
}

/// File-per-key storage under a directory, by default
/// `~/.config/meyousafe/`.
///
pub struct FileBackend {
    directory: PathBuf,
}

impl FileBackend {
    /// Return a backend rooted at the given directory.
    ///
    pub fn new<P: AsRef<Path>>(directory: P) -> FileBackend {
        FileBackend {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    /// Return a backend rooted at the default directory under the user's
    /// home.
    ///
    pub fn default_location() -> Result<FileBackend, StorageError> {
        match dirs::home_dir() {
            Some(home) => Ok(FileBackend::new(home.join(DEFAULT_DIRECTORY_PATH))),
            None => Err(StorageError::HomeDirectoryNotFound),
        }
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{}.json", key))
    }

    fn try_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| StorageError::ReadFailed { path, source: e })
    }

    fn try_remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key);
        if !path.exists() {
            return Ok(());
        }
        fs::remove_file(&path).map_err(|e| StorageError::RemoveFailed { path, source: e })
    }

    fn try_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if !self.directory.exists() {
            fs::create_dir_all(&self.directory).map_err(|e| {
                StorageError::CreateDirectoryFailed {
                    path: self.directory.clone(),
                    source: e,
                }
            })?;
        }

        let path = self.slot_path(key);
        let mut file = fs::File::create(&path).map_err(|e| StorageError::WriteFailed {
            path: path.clone(),
            source: e,
        })?;
        write!(file, "{}", value).map_err(|e| StorageError::WriteFailed {
            path: path.clone(),
            source: e,
        })?;
        file.flush().map_err(|e| StorageError::WriteFailed {
            path,
            source: e,
        })?;
        Ok(())
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &str) -> Option<String> {
        match self.try_get(key) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> bool {
        match self.try_set(key, value) {
            Ok(()) => true,
            Err(e) => {
                warn!("Storage unavailable: {}", e);
                false
            }
        }
    }

    fn remove(&self, key: &str) -> bool {
        match self.try_remove(key) {
            Ok(()) => true,
            Err(e) => {
                warn!("{}", e);
                false
            }
        }
    }
}

/// In-memory storage for tests and for simulating unavailable storage.
///
pub struct MemoryBackend {
    slots: Mutex<HashMap<String, String>>,
    available: bool,
}

impl MemoryBackend {
    pub fn new() -> MemoryBackend {
        MemoryBackend {
            slots: Mutex::new(HashMap::new()),
            available: true,
        }
    }

    /// Return a backend that rejects every read and write, mimicking
    /// private browsing or an exceeded quota.
    ///
    pub fn unavailable() -> MemoryBackend {
        MemoryBackend {
            slots: Mutex::new(HashMap::new()),
            available: false,
        }
    }

    fn slots(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryBackend {
    fn default() -> MemoryBackend {
        MemoryBackend::new()
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Option<String> {
        if !self.available {
            return None;
        }
        self.slots().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        if !self.available {
            return false;
        }
        self.slots().insert(key.to_owned(), value.to_owned());
        true
    }

    fn remove(&self, key: &str) -> bool {
        if !self.available {
            return false;
        }
        self.slots().remove(key);
        true
    }
}

/// Saves and restores form progress through a storage backend.
///
#[derive(Clone)]
pub struct ProgressStore {
    backend: Arc<dyn StorageBackend>,
    key: String,
}

impl ProgressStore {
    /// Return a store over the given backend using the standard slot key.
    ///
    pub fn new(backend: Arc<dyn StorageBackend>) -> ProgressStore {
        ProgressStore::with_key(backend, PROGRESS_KEY)
    }

    /// Return a store over the given backend and slot key.
    ///
    pub fn with_key(backend: Arc<dyn StorageBackend>, key: &str) -> ProgressStore {
        ProgressStore {
            backend,
            key: key.to_owned(),
        }
    }

    /// Serialize the session and overwrite the slot. Storage failure is
    /// reported as `false` and logged; it never blocks the caller.
    ///
    pub fn save(&self, session: &FormSession) -> bool {
        let snapshot = PersistedProgress {
            current_step: session.current_step(),
            form_data: session.answers().clone(),
            report_id: session.submission_id().map(str::to_owned),
            timestamp: Utc::now(),
        };
        let serialized = match serde_json::to_string(&snapshot) {
            Ok(serialized) => serialized,
            Err(e) => {
                warn!("{}", StorageError::SerializationFailed(e.to_string()));
                return false;
            }
        };
        let saved = self.backend.set(&self.key, &serialized);
        if saved {
            debug!("Saved form progress at step {}", snapshot.current_step);
        }
        saved
    }

    /// Read the slot back. Absent, unparsable, or schema-invalid data all
    /// degrade to no progress found.
    ///
    pub fn load(&self) -> Option<PersistedProgress> {
        let stored = self.backend.get(&self.key)?;
        match serde_json::from_str(&stored) {
            Ok(progress) => Some(progress),
            Err(e) => {
                warn!("Discarding malformed progress snapshot: {}", e);
                None
            }
        }
    }

    /// Load the slot and apply it to the session. Returns whether a
    /// snapshot was applied.
    ///
    pub fn restore_into(&self, session: &mut FormSession) -> bool {
        match self.load() {
            Some(progress) => {
                session.restore(progress.current_step, progress.form_data, progress.report_id);
                info!("Restored saved form progress");
                true
            }
            None => false,
        }
    }

    /// Remove the slot. Clearing an absent slot succeeds.
    ///
    pub fn clear(&self) -> bool {
        self.backend.remove(&self.key)
    }
}

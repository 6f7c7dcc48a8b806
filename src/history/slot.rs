//! Durable storage slots: one named location holding the serialized history.
//!
//! DESIGN
//! ======
//! The store only needs "read the whole slot" and "replace the whole slot",
//! so the seam is a two-method trait. Native builds persist to a JSON file;
//! the `browser` feature adds a `localStorage` slot; tests use `MemorySlot`,
//! which can also simulate a full or disabled storage backend.

#[cfg(test)]
#[path = "slot_test.rs"]
mod slot_test;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Storage-layer failures. Recovered locally by the history store.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage write failed: {0}")]
    Write(String),
    #[error("snapshot encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A single named slot in a durable client store.
pub trait StorageSlot: Send {
    /// Read the slot. `Ok(None)` when nothing has been written yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read at all.
    fn read(&self) -> Result<Option<String>, PersistenceError>;

    /// Replace the slot's contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write (quota, disabled).
    fn write(&mut self, contents: &str) -> Result<(), PersistenceError>;
}

// =============================================================================
// MEMORY SLOT
// =============================================================================

#[derive(Debug, Default)]
struct MemoryInner {
    contents: Option<String>,
    reject_writes: Option<String>,
    writes: usize,
}

/// In-memory slot. Clones share the same backing cell.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemorySlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot pre-loaded with raw contents (possibly corrupt).
    #[must_use]
    pub fn with_contents(contents: impl Into<String>) -> Self {
        let slot = Self::new();
        slot.lock().contents = Some(contents.into());
        slot
    }

    /// Make every subsequent write fail with `reason`. `None` restores writes.
    pub fn reject_writes(&self, reason: Option<&str>) {
        self.lock().reject_writes = reason.map(str::to_owned);
    }

    /// Raw contents currently held.
    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.lock().contents.clone()
    }

    /// Number of successful writes.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl StorageSlot for MemorySlot {
    fn read(&self) -> Result<Option<String>, PersistenceError> {
        Ok(self.lock().contents.clone())
    }

    fn write(&mut self, contents: &str) -> Result<(), PersistenceError> {
        let mut inner = self.lock();
        if let Some(reason) = &inner.reject_writes {
            return Err(PersistenceError::Write(reason.clone()));
        }
        inner.contents = Some(contents.to_owned());
        inner.writes += 1;
        Ok(())
    }
}

// =============================================================================
// FILE SLOT
// =============================================================================

/// Slot backed by a JSON file. Writes go through a sibling temp file and a
/// rename so a crash never leaves a half-written snapshot behind.
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StorageSlot for FileSlot {
    fn read(&self) -> Result<Option<String>, PersistenceError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PersistenceError::Unavailable(format!("{}: {e}", self.path.display()))),
        }
    }

    fn write(&mut self, contents: &str) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| PersistenceError::Unavailable(format!("{}: {e}", parent.display())))?;
            }
        }
        let temp = self.temp_path();
        std::fs::write(&temp, contents).map_err(|e| PersistenceError::Write(format!("{}: {e}", temp.display())))?;
        std::fs::rename(&temp, &self.path)
            .map_err(|e| PersistenceError::Write(format!("{}: {e}", self.path.display())))
    }
}

// =============================================================================
// LOCAL STORAGE SLOT
// =============================================================================

/// Slot backed by the browser's `localStorage` under a fixed key.
#[cfg(feature = "browser")]
#[derive(Debug, Clone)]
pub struct LocalStorageSlot {
    key: String,
}

#[cfg(feature = "browser")]
impl LocalStorageSlot {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage() -> Result<web_sys::Storage, PersistenceError> {
        let window = web_sys::window().ok_or_else(|| PersistenceError::Unavailable("no window".into()))?;
        match window.local_storage() {
            Ok(Some(storage)) => Ok(storage),
            Ok(None) => Err(PersistenceError::Unavailable("localStorage disabled".into())),
            Err(e) => Err(PersistenceError::Unavailable(format!("{e:?}"))),
        }
    }
}

#[cfg(feature = "browser")]
impl Default for LocalStorageSlot {
    fn default() -> Self {
        Self::new(super::HISTORY_SLOT)
    }
}

// Holds only the key; the `Storage` handle is looked up per call.
#[cfg(feature = "browser")]
impl StorageSlot for LocalStorageSlot {
    fn read(&self) -> Result<Option<String>, PersistenceError> {
        Self::storage()?
            .get_item(&self.key)
            .map_err(|e| PersistenceError::Unavailable(format!("{e:?}")))
    }

    fn write(&mut self, contents: &str) -> Result<(), PersistenceError> {
        Self::storage()?
            .set_item(&self.key, contents)
            .map_err(|e| PersistenceError::Write(format!("{e:?}")))
    }
}

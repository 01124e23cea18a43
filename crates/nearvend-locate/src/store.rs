//! Persistence for the resolved location.
//!
//! The store keeps at most one [`LocationState`]. A stored user-entered
//! location survives restarts and outranks provider detection until it
//! expires; stored detected locations are used as a warm-start hint.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use nearvend_core::LocationState;

use crate::error::LocateError;

pub trait LocationStore: Send + Sync {
    /// Returns the stored location, or `None` when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns [`LocateError::StoreIo`] or [`LocateError::StoreParse`] when
    /// the backing state exists but cannot be read.
    fn load(&self) -> Result<Option<LocationState>, LocateError>;

    /// Replaces the stored location.
    ///
    /// # Errors
    ///
    /// Returns [`LocateError::StoreIo`] when the state cannot be written.
    fn save(&self, state: &LocationState) -> Result<(), LocateError>;

    /// Removes the stored location, if any.
    ///
    /// # Errors
    ///
    /// Returns [`LocateError::StoreIo`] when removal fails.
    fn clear(&self) -> Result<(), LocateError>;
}

/// In-memory store, used in tests and for ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryLocationStore {
    inner: Mutex<Option<LocationState>>,
}

impl MemoryLocationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocationStore for MemoryLocationStore {
    fn load(&self) -> Result<Option<LocationState>, LocateError> {
        let guard = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(guard.clone())
    }

    fn save(&self, state: &LocationState) -> Result<(), LocateError> {
        let mut guard = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = Some(state.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), LocateError> {
        let mut guard = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = None;
        Ok(())
    }
}

/// JSON-file-backed store. The file holds a single serialized
/// [`LocationState`]; parent directories are created on first save.
#[derive(Debug, Clone)]
pub struct FileLocationStore {
    path: PathBuf,
}

impl FileLocationStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> LocateError {
        LocateError::StoreIo {
            path: self.path.clone(),
            source,
        }
    }
}

impl LocationStore for FileLocationStore {
    fn load(&self) -> Result<Option<LocationState>, LocateError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_err(e)),
        };
        let state: LocationState = serde_json::from_str(&raw)?;
        Ok(Some(state))
    }

    fn save(&self, state: &LocationState) -> Result<(), LocateError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
            }
        }
        let raw = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.path, raw).map_err(|e| self.io_err(e))
    }

    fn clear(&self) -> Result<(), LocateError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_err(e)),
        }
    }
}

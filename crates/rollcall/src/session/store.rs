//! Session persistence.
//!
//! A store holds at most one session, and every operation replaces or
//! removes the whole record. Partial-field updates are not expressible
//! through the trait.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::StoreError;

use super::Session;

/// Wholesale persistence for the authenticated [`Session`].
pub trait SessionStore: Send + Sync {
    /// Replace whatever is stored with `session`.
    fn save(&self, session: &Session) -> Result<(), StoreError>;

    /// Read back the stored session, if any.
    fn load(&self) -> Result<Option<Session>, StoreError>;

    /// Remove the stored session. Clearing an empty store is a no-op.
    fn clear(&self) -> Result<(), StoreError>;
}

/// In-memory store for tests and embedders that manage persistence
/// themselves.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    slot: Mutex<Option<Session>>,
}

impl InMemorySessionStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new store wrapped in Arc for sharing.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Session>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStore for InMemorySessionStore {
    fn save(&self, session: &Session) -> Result<(), StoreError> {
        *self.lock() = Some(session.clone());
        tracing::debug!("session stored in memory");
        Ok(())
    }

    fn load(&self) -> Result<Option<Session>, StoreError> {
        Ok(self.lock().clone())
    }

    fn clear(&self) -> Result<(), StoreError> {
        if self.lock().take().is_some() {
            tracing::debug!("in-memory session cleared");
        }
        Ok(())
    }
}

/// File-backed store keeping the session in a single JSON document.
///
/// Saves write through a temp file in the same directory followed by a
/// rename, so a reader never observes a torn document.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Store sessions at `path`. Parent directories are created on the
    /// first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Where the session document lives.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl SessionStore for FileSessionStore {
    fn save(&self, session: &Session) -> Result<(), StoreError> {
        let parent = self.parent_dir();
        fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;

        let document = serde_json::to_vec_pretty(session)
            .map_err(|e| StoreError::Invalid(e.to_string()))?;

        let mut staged = tempfile::NamedTempFile::new_in(parent).map_err(|e| self.io_error(e))?;
        staged.write_all(&document).map_err(|e| self.io_error(e))?;
        staged
            .persist(&self.path)
            .map_err(|e| self.io_error(e.error))?;

        tracing::debug!(path = %self.path.display(), "session persisted");
        Ok(())
    }

    fn load(&self) -> Result<Option<Session>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        let session =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::Invalid(e.to_string()))?;
        Ok(Some(session))
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "session file removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

//! Persisted client-side key-value storage.
//!
//! DESIGN
//! ======
//! One `Storage` interface is injected into every component that touches
//! persisted session state (session store, HTTP wrapper, route guard), so
//! there is a single seam instead of ad hoc direct access scattered across
//! layers. The interface mirrors the browser storage it models: synchronous
//! string get/set/remove, writes that never surface errors to callers
//! (failures are logged and the in-memory view stays authoritative).
//!
//! Concurrent processes sharing one `FileStorage` path can race each other's
//! writes; refresh deduplication across processes is explicitly not provided.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

/// Bearer credential for authenticated requests.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
/// Long-lived credential used solely to mint a new token pair.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
/// Current user record, JSON-encoded.
pub const USER_KEY: &str = "user";
/// Currently selected organization id.
pub const CURRENT_ORGANIZATION_KEY: &str = "currentOrganizationId";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage file is not a valid key-value map: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

// =============================================================================
// FILE STORAGE
// =============================================================================

/// Durable storage backed by a JSON map on disk.
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Open (or create) the storage file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str::<HashMap<String, String>>(&raw)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, entries: Mutex::new(entries) })
    }

    fn flush(&self, entries: &HashMap<String, String>) {
        let raw = match serde_json::to_string_pretty(entries) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(error = %err, "storage serialization failed");
                return;
            }
        };
        if let Err(err) = std::fs::write(&self.path, raw) {
            tracing::warn!(error = %err, path = %self.path.display(), "storage write failed");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.lock();
        entries.insert(key.to_owned(), value.to_owned());
        self.flush(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.lock();
        if entries.remove(key).is_some() {
            self.flush(&entries);
        }
    }
}

// =============================================================================
// MEMORY STORAGE
// =============================================================================

/// Volatile storage for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.lock().insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        self.lock().remove(key);
    }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;

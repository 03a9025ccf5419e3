//! Session Store
//!
//! The single source of truth for the bearer token. The token lives under a
//! fixed key in a client-local key-value store (a JSON file on disk, or an
//! in-memory map), and every change is broadcast over a `watch` channel so the
//! HTTP client and the views observe the same value.

use crate::error::StorageError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Storage key for the bearer token
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Client-local key-value storage
pub trait TokenStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Volatile storage, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// JSON file storage, written through on every change
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileStorage {
    /// Open the storage file, starting empty if it does not exist
    ///
    /// A file that does not parse is treated as empty and replaced on the
    /// next write, so a damaged store signs the user out instead of failing.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = if path.exists() {
            let data = std::fs::read_to_string(&path)?;
            if data.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&data).unwrap_or_else(|e| {
                    warn!(
                        "Client storage at {} is unreadable, starting empty: {}",
                        path.display(),
                        e
                    );
                    HashMap::new()
                })
            }
        } else {
            HashMap::new()
        };

        debug!("Opened client storage at {} ({} entries)", path.display(), entries.len());

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let data = serde_json::to_string_pretty(entries)?;

        // Write atomically via temp file
        let temp_path = self.path.with_extension("tmp");
        std::fs::write(&temp_path, data)?;
        std::fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl TokenStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write();
        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write();
        if entries.contains_key(key) {
            let mut next = entries.clone();
            next.remove(key);
            self.flush(&next)?;
            *entries = next;
        }
        Ok(())
    }
}

struct SessionInner {
    storage: Box<dyn TokenStorage>,
    token_tx: watch::Sender<Option<String>>,
}

/// Shared handle to the persisted session token
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

impl SessionStore {
    /// Wrap a storage backend, picking up any token it already holds
    pub fn new(storage: impl TokenStorage + 'static) -> Self {
        let initial = storage.get(ACCESS_TOKEN_KEY);
        let (token_tx, _) = watch::channel(initial);

        Self {
            inner: Arc::new(SessionInner {
                storage: Box::new(storage),
                token_tx,
            }),
        }
    }

    /// Session backed by a volatile map
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    /// Session backed by a JSON file
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        Ok(Self::new(FileStorage::open(path)?))
    }

    /// Current token, if any
    pub fn token(&self) -> Option<String> {
        self.inner.token_tx.borrow().clone()
    }

    /// Whether a token is present (validity is not checked)
    pub fn is_present(&self) -> bool {
        self.inner.token_tx.borrow().is_some()
    }

    /// Persist a new token
    pub fn set(&self, token: &str) -> Result<(), StorageError> {
        self.inner.storage.set(ACCESS_TOKEN_KEY, token)?;
        self.inner.token_tx.send_replace(Some(token.to_string()));
        debug!("Session token stored");
        Ok(())
    }

    /// Destroy the token
    ///
    /// The in-memory value is cleared even if the storage write fails, so the
    /// session is never observed as present after this call.
    pub fn clear(&self) -> Result<(), StorageError> {
        let had_token = self.inner.token_tx.send_replace(None).is_some();
        if had_token {
            debug!("Session token cleared");
        }
        self.inner.storage.remove(ACCESS_TOKEN_KEY).map_err(|e| {
            warn!("Failed to remove persisted session token: {}", e);
            e
        })
    }

    /// Observe token changes
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.inner.token_tx.subscribe()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("present", &self.is_present())
            .finish()
    }
}

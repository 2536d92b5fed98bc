//! Durable key/value storage for the client session.
//!
//! Values are plain strings stored under a small fixed set of keys. The file
//! backend keeps one file per key under a data directory; the memory backend
//! is used in tests and for throwaway sessions.

use std::path::{Path, PathBuf};

use dashmap::DashMap;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error for {key}: {source}")]
    Io {
        key: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt value stored under {key}: {reason}")]
    Corrupt { key: &'static str, reason: String },
}

/// Fixed storage keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// JSON-serialized user profile.
    User,
    /// Raw access token string.
    Token,
    /// Theme preference.
    Theme,
}

impl StorageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Token => "token",
            Self::Theme => "theme",
        }
    }
}

/// Synchronous string storage that survives restarts.
///
/// Implementations do no locking beyond what a single write needs; concurrent
/// writers race and the last one wins.
pub trait DurableStorage: Send + Sync + 'static {
    fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError>;

    fn set(&self, key: StorageKey, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: StorageKey) -> Result<(), StorageError>;
}

/// Stores each key as `<dir>/<key>`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: StorageKey) -> PathBuf {
        self.dir.join(key.as_str())
    }
}

impl DurableStorage for FileStorage {
    fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        let path = self.path(key);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.as_str(),
                source,
            }),
        }
    }

    fn set(&self, key: StorageKey, value: &str) -> Result<(), StorageError> {
        let io_error = |source| StorageError::Io {
            key: key.as_str(),
            source,
        };

        std::fs::create_dir_all(&self.dir).map_err(io_error)?;

        // Readers never observe a half-written value.
        let path = self.path(key);
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, value).map_err(io_error)?;
        std::fs::rename(&tmp, &path).map_err(io_error)?;

        debug!("Stored {} in {}", key.as_str(), self.dir.display());
        Ok(())
    }

    fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => {
                warn!("Failed to remove {}: {}", key.as_str(), source);
                Err(StorageError::Io {
                    key: key.as_str(),
                    source,
                })
            }
        }
    }
}

/// In-process storage backed by a concurrent map.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: DashMap<StorageKey, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DurableStorage for MemoryStorage {
    fn get(&self, key: StorageKey) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(&key).map(|v| v.value().clone()))
    }

    fn set(&self, key: StorageKey, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: StorageKey) -> Result<(), StorageError> {
        self.entries.remove(&key);
        Ok(())
    }
}

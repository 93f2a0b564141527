//! Persisted session storage.
//!
//! A tiny key-value store holding the bearer token and the cached user
//! record, so a session survives process restarts. Writes are whole-value
//! and last-write-wins; when several processes share the same cache
//! directory they reconcile through [`StorageEvent`] notifications rather
//! than any ordering guarantee.

use std::{
    collections::HashMap,
    fs, io,
    path::PathBuf,
    sync::Mutex,
};

/// The storage key holding the raw bearer token.
pub const AUTH_TOKEN_KEY: &str = "authToken";
/// The storage key holding the JSON-serialized user record.
pub const CURRENT_USER_KEY: &str = "currentUser";

/// Whole-value key-value persistence for session state.
pub trait Storage {
    /// Look up a key. Absent keys are `Ok(None)`, not an error.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Remove a key. Removing an absent key is fine.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Notification that some other actor changed a storage key.
///
/// Whoever watches the shared store (another process logging out, a file
/// watcher) builds one of these and hands it to the session manager. There
/// is no ambient global listener.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageEvent {
    pub key: String,
}

impl StorageEvent {
    pub fn new(key: impl Into<String>) -> StorageEvent {
        StorageEvent { key: key.into() }
    }
}

/// An in-process store, mainly for tests and short-lived tools.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore { MemoryStore::default() }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // a poisoned map is still a map
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Storage for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values().remove(key);
        Ok(())
    }
}

/// A store keeping one file per key under a cache directory.
///
/// The directory is created lazily on the first write, so constructing a
/// `FileStore` never touches the filesystem.
#[derive(Debug, Clone, PartialEq)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> FileStore {
        FileStore { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf { self.dir.join(key) }
}

impl Storage for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(ref e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(inner) => Err(StorageError::Read {
                key: key.to_string(),
                inner,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|inner| {
            StorageError::Write {
                key: key.to_string(),
                inner,
            }
        })?;

        fs::write(self.path_for(key), value).map_err(|inner| {
            StorageError::Write {
                key: key.to_string(),
                inner,
            }
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(ref e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(inner) => Err(StorageError::Write {
                key: key.to_string(),
                inner,
            }),
        }
    }
}

/// Possible errors when touching persisted storage.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Unable to read the \"{}\" key", key)]
    Read {
        key: String,
        #[source]
        inner: io::Error,
    },
    #[error("Unable to write the \"{}\" key", key)]
    Write {
        key: String,
        #[source]
        inner: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();

        assert_eq!(store.get(AUTH_TOKEN_KEY).unwrap(), None);

        store.set(AUTH_TOKEN_KEY, "a.b.c").unwrap();
        assert_eq!(
            store.get(AUTH_TOKEN_KEY).unwrap().as_deref(),
            Some("a.b.c")
        );

        store.remove(AUTH_TOKEN_KEY).unwrap();
        assert_eq!(store.get(AUTH_TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn removing_an_absent_key_is_fine() {
        let store = MemoryStore::new();

        assert!(store.remove("neverSet").is_ok());
    }

    #[test]
    fn file_store_round_trip() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp.path().join("session"));

        // nothing on disk yet
        assert_eq!(store.get(CURRENT_USER_KEY).unwrap(), None);

        store.set(CURRENT_USER_KEY, r#"{"accountName":"alice"}"#).unwrap();
        assert_eq!(
            store.get(CURRENT_USER_KEY).unwrap().as_deref(),
            Some(r#"{"accountName":"alice"}"#)
        );

        store.remove(CURRENT_USER_KEY).unwrap();
        assert_eq!(store.get(CURRENT_USER_KEY).unwrap(), None);
        assert!(store.remove(CURRENT_USER_KEY).is_ok());
    }

    #[test]
    fn file_store_last_write_wins() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileStore::new(temp.path());
        let same_dir = FileStore::new(temp.path());

        store.set(AUTH_TOKEN_KEY, "first").unwrap();
        same_dir.set(AUTH_TOKEN_KEY, "second").unwrap();

        assert_eq!(
            store.get(AUTH_TOKEN_KEY).unwrap().as_deref(),
            Some("second")
        );
    }
}

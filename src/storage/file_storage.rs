use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use super::Storage;
use crate::error::StorageError;

/// A storage backed by one JSON object file.
///
/// The whole file is rewritten on every mutation; the in-memory copy is only
/// updated once the write succeeded, so memory and disk never disagree.
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open (or lazily create) the storage file at `path`. A missing or
    /// empty file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!("Loaded {} storage entries from '{}'", entries.len(), path.display());
        Ok(FileStorage {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let rendered = serde_json::to_string_pretty(entries)?;
        let staging = self.path.with_extension("tmp");
        fs::write(&staging, rendered)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }

    fn mutate<F>(&self, change: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = entries.clone();
        change(&mut next);
        if next == *entries {
            return Ok(());
        }
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.mutate(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.mutate(|entries| {
            entries.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("session.json");

        let storage = FileStorage::open(&path).expect("open");
        storage.set_item("token", "abc").unwrap();
        storage.set_item("user", r#"{"username":"admin"}"#).unwrap();
        drop(storage);

        let reopened = FileStorage::open(&path).expect("reopen");
        assert_eq!(reopened.get_item("token").unwrap().as_deref(), Some("abc"));
        assert_eq!(
            reopened.get_item("user").unwrap().as_deref(),
            Some(r#"{"username":"admin"}"#)
        );

        reopened.remove_item("token").unwrap();
        let again = FileStorage::open(&path).expect("reopen");
        assert_eq!(again.get_item("token").unwrap(), None);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        let result = FileStorage::open(&path);
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }

    #[test]
    fn empty_file_is_an_empty_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        fs::write(&path, "\n").unwrap();

        let storage = FileStorage::open(&path).expect("open");
        assert_eq!(storage.get_item("token").unwrap(), None);
    }
}

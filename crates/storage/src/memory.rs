//! `MemoryFileStore` — a test double for `FileStore`.
//!
//! Useful in unit and router tests where touching the disk is irrelevant.
//! Paths are synthesised under a fake root so callers still get something to
//! log in the contributions table.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::folder::validate_name;
use crate::{FileStore, FolderKind, StorageError, StoredFile};

type Files = BTreeMap<(FolderKind, String), (Vec<u8>, DateTime<Utc>)>;

/// In-memory [`FileStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryFileStore {
    files: Arc<Mutex<Files>>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of files across all folders.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Files> {
        // A panic while holding the lock leaves the map itself intact.
        self.files.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn key(folder: FolderKind, name: &str) -> Result<(FolderKind, String), StorageError> {
        validate_name(name)?;
        Ok((folder, name.to_owned()))
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn save(
        &self,
        folder: FolderKind,
        name: &str,
        bytes: &[u8],
    ) -> Result<PathBuf, StorageError> {
        let key = Self::key(folder, name)?;
        self.lock().insert(key, (bytes.to_vec(), Utc::now()));
        self.path_of(folder, name)
    }

    async fn read(&self, folder: FolderKind, name: &str) -> Result<Vec<u8>, StorageError> {
        let key = Self::key(folder, name)?;
        self.lock()
            .get(&key)
            .map(|(bytes, _)| bytes.clone())
            .ok_or(StorageError::NotFound { folder, name: name.to_owned() })
    }

    async fn delete(&self, folder: FolderKind, name: &str) -> Result<(), StorageError> {
        let key = Self::key(folder, name)?;
        self.lock()
            .remove(&key)
            .map(|_| ())
            .ok_or(StorageError::NotFound { folder, name: name.to_owned() })
    }

    async fn list(&self, folder: FolderKind) -> Result<Vec<StoredFile>, StorageError> {
        Ok(self
            .lock()
            .iter()
            .filter(|((kind, _), _)| *kind == folder)
            .map(|((_, name), (bytes, modified))| StoredFile {
                name: name.clone(),
                size_bytes: bytes.len() as u64,
                modified: *modified,
            })
            .collect())
    }

    async fn exists(&self, folder: FolderKind, name: &str) -> Result<bool, StorageError> {
        let key = Self::key(folder, name)?;
        Ok(self.lock().contains_key(&key))
    }

    fn path_of(&self, folder: FolderKind, name: &str) -> Result<PathBuf, StorageError> {
        validate_name(name)?;
        Ok(PathBuf::from("/memory").join(folder.to_string()).join(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn folders_are_independent() {
        let store = MemoryFileStore::new();
        store.save(FolderKind::Rasters, "a.tif", b"1").await.unwrap();
        store.save(FolderKind::Contributions, "a.tif", b"22").await.unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.read(FolderKind::Contributions, "a.tif").await.unwrap(), b"22");

        store.delete(FolderKind::Rasters, "a.tif").await.unwrap();
        assert!(store.list(FolderKind::Rasters).await.unwrap().is_empty());
        assert_eq!(store.list(FolderKind::Contributions).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_is_sorted_by_name() {
        let store = MemoryFileStore::new();
        for name in ["c.tif", "a.tif", "b.tif"] {
            store.save(FolderKind::Rasters, name, b"").await.unwrap();
        }
        let names: Vec<String> = store
            .list(FolderKind::Rasters)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["a.tif", "b.tif", "c.tif"]);
    }
}

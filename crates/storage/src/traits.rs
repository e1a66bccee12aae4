//! The `FileStore` trait — the contract every upload store must fulfil.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{FolderKind, StorageError};

/// A file found while listing a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    pub name: String,
    pub size_bytes: u64,
    /// Last modification time, shown as the upload time.
    pub modified: DateTime<Utc>,
}

impl StoredFile {
    pub fn size_kb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }
}

/// Flat-folder file storage.
///
/// Names are literal file names inside a folder.  Implementations must
/// reject names failing [`crate::folder::validate_name`].
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Write `bytes` under `name`, replacing any existing file.
    /// Returns the path the file was stored at.
    async fn save(
        &self,
        folder: FolderKind,
        name: &str,
        bytes: &[u8],
    ) -> Result<PathBuf, StorageError>;

    async fn read(&self, folder: FolderKind, name: &str) -> Result<Vec<u8>, StorageError>;

    /// Remove a file.  Fails with `NotFound` when it does not exist.
    async fn delete(&self, folder: FolderKind, name: &str) -> Result<(), StorageError>;

    /// Every regular file in the folder, sorted by name.
    async fn list(&self, folder: FolderKind) -> Result<Vec<StoredFile>, StorageError>;

    async fn exists(&self, folder: FolderKind, name: &str) -> Result<bool, StorageError>;

    /// Path a file with this name is (or would be) stored at.
    fn path_of(&self, folder: FolderKind, name: &str) -> Result<PathBuf, StorageError>;
}

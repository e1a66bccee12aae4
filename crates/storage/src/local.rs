//! Local filesystem store.
//!
//! Each [`FolderKind`] maps onto one configured directory.  Directories are
//! created on first write, and a missing directory lists as empty.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::folder::validate_name;
use crate::{FileStore, FolderKind, StorageError, StoredFile};

/// Disk-backed [`FileStore`].
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    raster_dir: PathBuf,
    dataset_dir: PathBuf,
    contributions_dir: PathBuf,
}

impl LocalFileStore {
    pub fn new(
        raster_dir: impl Into<PathBuf>,
        dataset_dir: impl Into<PathBuf>,
        contributions_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            raster_dir: raster_dir.into(),
            dataset_dir: dataset_dir.into(),
            contributions_dir: contributions_dir.into(),
        }
    }

    /// Directory backing `folder`.
    pub fn dir(&self, folder: FolderKind) -> &PathBuf {
        match folder {
            FolderKind::Rasters => &self.raster_dir,
            FolderKind::Datasets => &self.dataset_dir,
            FolderKind::Contributions => &self.contributions_dir,
        }
    }

    /// Create all three directories.
    pub async fn ensure_dirs(&self) -> Result<(), StorageError> {
        for folder in FolderKind::ALL {
            tokio::fs::create_dir_all(self.dir(folder)).await?;
        }
        Ok(())
    }

    fn not_found(folder: FolderKind, name: &str) -> StorageError {
        StorageError::NotFound { folder, name: name.to_owned() }
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn save(
        &self,
        folder: FolderKind,
        name: &str,
        bytes: &[u8],
    ) -> Result<PathBuf, StorageError> {
        let path = self.path_of(folder, name)?;
        tokio::fs::create_dir_all(self.dir(folder)).await?;
        tokio::fs::write(&path, bytes).await?;
        info!(%folder, name, bytes = bytes.len(), "stored file");
        Ok(path)
    }

    async fn read(&self, folder: FolderKind, name: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path_of(folder, name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Self::not_found(folder, name)),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, folder: FolderKind, name: &str) -> Result<(), StorageError> {
        let path = self.path_of(folder, name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!(%folder, name, "deleted file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Self::not_found(folder, name)),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, folder: FolderKind) -> Result<Vec<StoredFile>, StorageError> {
        let dir = self.dir(folder);
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(%folder, dir = %dir.display(), "folder missing, listing as empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            let modified: DateTime<Utc> = meta.modified().map(Into::into).unwrap_or_else(|_| Utc::now());
            files.push(StoredFile { name, size_bytes: meta.len(), modified });
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    async fn exists(&self, folder: FolderKind, name: &str) -> Result<bool, StorageError> {
        let path = self.path_of(folder, name)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }

    fn path_of(&self, folder: FolderKind, name: &str) -> Result<PathBuf, StorageError> {
        validate_name(name)?;
        Ok(self.dir(folder).join(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(tmp: &TempDir) -> LocalFileStore {
        LocalFileStore::new(
            tmp.path().join("TIFF images"),
            tmp.path().join("datasets"),
            tmp.path().join("map contributions"),
        )
    }

    #[tokio::test]
    async fn save_then_read_and_list() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);

        let path = store.save(FolderKind::Rasters, "b.tif", b"bbbb").await.unwrap();
        store.save(FolderKind::Rasters, "a.tif", b"a").await.unwrap();

        assert_eq!(path, tmp.path().join("TIFF images").join("b.tif"));
        assert!(path.exists());
        assert_eq!(store.read(FolderKind::Rasters, "b.tif").await.unwrap(), b"bbbb");

        let listed = store.list(FolderKind::Rasters).await.unwrap();
        let names: Vec<&str> = listed.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.tif", "b.tif"]);
        assert_eq!(listed[1].size_bytes, 4);
    }

    #[tokio::test]
    async fn same_name_overwrites() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);

        store.save(FolderKind::Datasets, "sizes.xlsx", b"old").await.unwrap();
        store.save(FolderKind::Datasets, "sizes.xlsx", b"new!").await.unwrap();

        assert_eq!(store.read(FolderKind::Datasets, "sizes.xlsx").await.unwrap(), b"new!");
        assert_eq!(store.list(FolderKind::Datasets).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_file() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let path = store.save(FolderKind::Contributions, "dams.shp", b"x").await.unwrap();

        store.delete(FolderKind::Contributions, "dams.shp").await.unwrap();

        assert!(!path.exists());
        assert!(!store.exists(FolderKind::Contributions, "dams.shp").await.unwrap());
        assert!(matches!(
            store.delete(FolderKind::Contributions, "dams.shp").await,
            Err(StorageError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn missing_folder_lists_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(store(&tmp).list(FolderKind::Rasters).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn escaping_names_are_rejected() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        assert!(matches!(
            store.save(FolderKind::Rasters, "../evil.tif", b"x").await,
            Err(StorageError::InvalidName(_))
        ));
    }
}

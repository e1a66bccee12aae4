//! Per-folder listing cache.
//!
//! The first listing of a folder is read from the store and kept; later
//! listings are served from memory.  Deleting through the cache drops the
//! entry, and any upload invalidates the folder so the next listing rereads it.
//!
//! Each folder carries a generation bumped by [`ListingCache::invalidate`].  A
//! listing read from the store is only kept if the generation is unchanged
//! once the read finishes, so an upload landing mid-read is never masked.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use tracing::debug;

use crate::{FileStore, FolderKind, StorageError, StoredFile};

#[derive(Debug, Default)]
struct Entries {
    files: HashMap<FolderKind, Vec<StoredFile>>,
    generations: HashMap<FolderKind, u64>,
}

impl Entries {
    fn generation(&self, folder: FolderKind) -> u64 {
        self.generations.get(&folder).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListingCache {
    entries: Arc<RwLock<Entries>>,
}

impl ListingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listed files of `folder`, filtered to the folder's listing extensions.
    pub async fn listing(
        &self,
        store: &dyn FileStore,
        folder: FolderKind,
    ) -> Result<Vec<StoredFile>, StorageError> {
        if let Some(files) = self.cached(folder) {
            return Ok(files);
        }

        let started = self.generation(folder);
        let files: Vec<StoredFile> = store
            .list(folder)
            .await?
            .into_iter()
            .filter(|f| folder.is_listed(&f.name))
            .collect();

        let mut entries = self.write();
        if entries.generation(folder) == started {
            debug!(%folder, count = files.len(), "caching folder listing");
            entries.files.insert(folder, files.clone());
        } else {
            debug!(%folder, "folder changed while listing, not caching");
        }
        Ok(files)
    }

    /// Cached listing filtered by a case-insensitive substring.
    pub async fn search(
        &self,
        store: &dyn FileStore,
        folder: FolderKind,
        query: &str,
    ) -> Result<Vec<StoredFile>, StorageError> {
        let files = self.listing(store, folder).await?;
        Ok(filter_by_name(files, query))
    }

    /// Delete the file from the store and from the cached listing.
    pub async fn delete(
        &self,
        store: &dyn FileStore,
        folder: FolderKind,
        name: &str,
    ) -> Result<(), StorageError> {
        store.delete(folder, name).await?;
        self.remove(folder, name);
        Ok(())
    }

    /// Drop one name from the cached listing, if the folder is cached.
    pub fn remove(&self, folder: FolderKind, name: &str) {
        if let Some(files) = self.write().files.get_mut(&folder) {
            files.retain(|f| f.name != name);
        }
    }

    /// Forget the folder so the next listing rereads the store.
    pub fn invalidate(&self, folder: FolderKind) {
        let mut entries = self.write();
        entries.files.remove(&folder);
        *entries.generations.entry(folder).or_insert(0) += 1;
    }

    pub fn cached(&self, folder: FolderKind) -> Option<Vec<StoredFile>> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .files
            .get(&folder)
            .cloned()
    }

    fn generation(&self, folder: FolderKind) -> u64 {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .generation(folder)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Keep files whose name contains `query`, ignoring case.  A blank query keeps all.
pub fn filter_by_name(files: Vec<StoredFile>, query: &str) -> Vec<StoredFile> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return files;
    }
    files
        .into_iter()
        .filter(|f| f.name.to_lowercase().contains(&query))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::MemoryFileStore;

    /// Store whose first listing races an upload: the upload is saved and the
    /// cache invalidated after the folder has been read.
    struct RacingStore {
        inner: MemoryFileStore,
        cache: ListingCache,
        raced: AtomicBool,
    }

    #[async_trait]
    impl FileStore for RacingStore {
        async fn save(&self, folder: FolderKind, name: &str, bytes: &[u8]) -> Result<PathBuf, StorageError> {
            self.inner.save(folder, name, bytes).await
        }

        async fn read(&self, folder: FolderKind, name: &str) -> Result<Vec<u8>, StorageError> {
            self.inner.read(folder, name).await
        }

        async fn delete(&self, folder: FolderKind, name: &str) -> Result<(), StorageError> {
            self.inner.delete(folder, name).await
        }

        async fn list(&self, folder: FolderKind) -> Result<Vec<StoredFile>, StorageError> {
            let files = self.inner.list(folder).await?;
            if !self.raced.swap(true, Ordering::SeqCst) {
                self.inner.save(folder, "late.tif", b"x").await?;
                self.cache.invalidate(folder);
            }
            Ok(files)
        }

        async fn exists(&self, folder: FolderKind, name: &str) -> Result<bool, StorageError> {
            self.inner.exists(folder, name).await
        }

        fn path_of(&self, folder: FolderKind, name: &str) -> Result<PathBuf, StorageError> {
            self.inner.path_of(folder, name)
        }
    }

    async fn seeded() -> (MemoryFileStore, ListingCache) {
        let store = MemoryFileStore::new();
        for name in ["Umguza.tif", "khami.tif", "notes.txt"] {
            store.save(FolderKind::Rasters, name, b"x").await.unwrap();
        }
        (store, ListingCache::new())
    }

    #[tokio::test]
    async fn listing_is_filtered_and_cached() {
        let (store, cache) = seeded().await;

        let first = cache.listing(&store, FolderKind::Rasters).await.unwrap();
        assert_eq!(first.len(), 2);

        // Written behind the cache's back: not visible until invalidated.
        store.save(FolderKind::Rasters, "new.tif", b"x").await.unwrap();
        assert_eq!(cache.listing(&store, FolderKind::Rasters).await.unwrap().len(), 2);

        cache.invalidate(FolderKind::Rasters);
        assert_eq!(cache.listing(&store, FolderKind::Rasters).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn upload_during_listing_is_not_masked() {
        let (inner, cache) = seeded().await;
        let store = RacingStore { inner, cache: cache.clone(), raced: AtomicBool::new(false) };

        // The racing read returns the old contents but must not be kept.
        let first = cache.listing(&store, FolderKind::Rasters).await.unwrap();
        assert_eq!(first.len(), 2);
        assert!(cache.cached(FolderKind::Rasters).is_none());

        let second = cache.listing(&store, FolderKind::Rasters).await.unwrap();
        assert!(second.iter().any(|f| f.name == "late.tif"));
        assert_eq!(cache.cached(FolderKind::Rasters).unwrap().len(), 3);
    }

    #[tokio::test]
    async fn delete_drops_cached_entry() {
        let (store, cache) = seeded().await;
        cache.listing(&store, FolderKind::Rasters).await.unwrap();

        cache.delete(&store, FolderKind::Rasters, "khami.tif").await.unwrap();

        let cached = cache.cached(FolderKind::Rasters).unwrap();
        assert!(cached.iter().all(|f| f.name != "khami.tif"));
        assert!(!store.exists(FolderKind::Rasters, "khami.tif").await.unwrap());
    }

    #[tokio::test]
    async fn failed_delete_keeps_cache() {
        let (store, cache) = seeded().await;
        cache.listing(&store, FolderKind::Rasters).await.unwrap();

        assert!(cache.delete(&store, FolderKind::Rasters, "ghost.tif").await.is_err());
        assert_eq!(cache.cached(FolderKind::Rasters).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn search_ignores_case() {
        let (store, cache) = seeded().await;
        let hits = cache.search(&store, FolderKind::Rasters, "UMG").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Umguza.tif");
        assert_eq!(cache.search(&store, FolderKind::Rasters, " ").await.unwrap().len(), 2);
    }
}

//! The `Portal` — shared handle used by both dashboards.

use std::sync::Arc;

use db::DbPool;
use storage::{FileStore, FolderKind, ListingCache, StoredFile};

use crate::ServiceError;

/// Pool, file store, and listing cache bundled together.
///
/// Cheap to clone; every clone shares the same pool, store, and cache.
#[derive(Clone)]
pub struct Portal {
    pool: DbPool,
    store: Arc<dyn FileStore>,
    listing: ListingCache,
}

impl Portal {
    pub fn new(pool: DbPool, store: Arc<dyn FileStore>) -> Self {
        Self { pool, store, listing: ListingCache::new() }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn store(&self) -> &dyn FileStore {
        self.store.as_ref()
    }

    pub fn listing(&self) -> &ListingCache {
        &self.listing
    }

    /// Files of `folder` that it normally shows, read straight from the store.
    pub(crate) async fn listed_files(
        &self,
        folder: FolderKind,
    ) -> Result<Vec<StoredFile>, ServiceError> {
        Ok(self
            .store
            .list(folder)
            .await?
            .into_iter()
            .filter(|f| folder.is_listed(&f.name))
            .collect())
    }
}

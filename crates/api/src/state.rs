//! Shared handler state.

use std::sync::Arc;

use service::Portal;
use storage::LocalFileStore;
use tracing::info;

use crate::config::Settings;

/// Cloned into every handler.  Both dashboards use the same shape.
#[derive(Clone)]
pub struct AppState {
    pub portal: Portal,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(portal: Portal, settings: Settings) -> Self {
        Self { portal, settings: Arc::new(settings) }
    }

    /// Open the database, run migrations, and create the upload folders.
    pub async fn init(settings: Settings) -> Result<Self, StartupError> {
        let pool = db::pool::connect(&settings.database_url, 5).await?;
        let store = LocalFileStore::new(
            settings.raster_dir.clone(),
            settings.dataset_dir.clone(),
            settings.contributions_dir.clone(),
        );
        store.ensure_dirs().await?;
        info!(
            rasters = %settings.raster_dir.display(),
            datasets = %settings.dataset_dir.display(),
            contributions = %settings.contributions_dir.display(),
            "upload folders ready"
        );
        Ok(Self::new(Portal::new(pool, Arc::new(store)), settings))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Database(#[from] db::DbError),

    #[error(transparent)]
    Storage(#[from] storage::StorageError),
}

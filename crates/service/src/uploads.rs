//! Admin raster uploads.
//!
//! An uploaded GeoTIFF keeps its original file name, overwrites any file of
//! the same name, and is logged in the contributions table under the fixed
//! admin attribution.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use db::{repository::contributions as contribution_repo, NewContribution};
use storage::listing::filter_by_name;
use storage::{FolderKind, StoredFile};

use crate::{Portal, ServiceError};

/// Contributor recorded for uploads made from the admin console.
pub const ADMIN_CONTRIBUTOR: &str = "Admin";
/// Email recorded for uploads made from the admin console.
pub const ADMIN_EMAIL: &str = "admin@example.com";

/// What the admin console reports after a successful upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub file_name: String,
    pub file_path: String,
    pub timestamp: String,
    pub contribution_id: i64,
}

impl Portal {
    /// Store a GeoTIFF in the raster folder and log it.
    #[instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub async fn upload_raster(
        &self,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<UploadReceipt, ServiceError> {
        if !FolderKind::Rasters.accepts_upload(file_name) {
            return Err(ServiceError::Validation(format!(
                "'{file_name}' is not a GeoTIFF (.tif, .tiff)"
            )));
        }

        let path = self.store().save(FolderKind::Rasters, file_name, bytes).await?;
        self.listing().invalidate(FolderKind::Rasters);

        let row = contribution_repo::insert_contribution(
            self.pool(),
            &NewContribution::now(
                file_name,
                ADMIN_CONTRIBUTOR,
                ADMIN_EMAIL,
                path.to_string_lossy(),
            ),
        )
        .await?;

        info!(file_name, id = row.id, "raster uploaded");
        Ok(UploadReceipt {
            file_name: file_name.to_owned(),
            file_path: row.file_path,
            timestamp: row.timestamp,
            contribution_id: row.id,
        })
    }

    /// Uploaded rasters, optionally filtered by a name search.  Served from the
    /// listing cache after the first call.
    pub async fn list_rasters(&self, search: Option<&str>) -> Result<Vec<StoredFile>, ServiceError> {
        let files = self
            .listing()
            .search(self.store(), FolderKind::Rasters, search.unwrap_or(""))
            .await?;
        Ok(files)
    }

    /// Uploaded rasters read straight from the folder, for the public viewer.
    /// Another process's uploads and deletes show up on the next call.
    pub async fn browse_rasters(&self, search: Option<&str>) -> Result<Vec<StoredFile>, ServiceError> {
        let files = self.listed_files(FolderKind::Rasters).await?;
        Ok(filter_by_name(files, search.unwrap_or("")))
    }

    /// Delete an uploaded raster.  Its log row is kept.
    pub async fn delete_raster(&self, file_name: &str) -> Result<(), ServiceError> {
        self.listing().delete(self.store(), FolderKind::Rasters, file_name).await?;
        info!(file_name, "raster deleted");
        Ok(())
    }

    pub async fn read_raster(&self, file_name: &str) -> Result<Vec<u8>, ServiceError> {
        Ok(self.store().read(FolderKind::Rasters, file_name).await?)
    }
}

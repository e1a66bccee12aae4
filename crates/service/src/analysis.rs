//! Viewer-side raster analysis.  Decoding runs on the blocking pool.

use raster::{analyze, normalize, read_geotiff, render_heatmap_png, RasterAnalysis};
use tracing::instrument;

use crate::{Portal, ServiceError};

impl Portal {
    /// Metadata and water body count for a stored raster.
    #[instrument(skip(self))]
    pub async fn analyze_raster(&self, file_name: &str) -> Result<RasterAnalysis, ServiceError> {
        let bytes = self.read_raster(file_name).await?;
        let analysis = tokio::task::spawn_blocking(move || analyze(&bytes)).await??;
        Ok(analysis)
    }

    /// PNG heatmap of a stored raster's normalized first band.
    #[instrument(skip(self))]
    pub async fn raster_heatmap(&self, file_name: &str) -> Result<Vec<u8>, ServiceError> {
        let bytes = self.read_raster(file_name).await?;
        let png = tokio::task::spawn_blocking(move || {
            let image = read_geotiff(&bytes)?;
            render_heatmap_png(&normalize(&image.grid))
        })
        .await??;
        Ok(png)
    }
}

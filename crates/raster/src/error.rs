//! Raster-level error types.

use thiserror::Error;

/// Errors produced while decoding or rendering a raster.
#[derive(Debug, Error)]
pub enum RasterError {
    /// The bytes are not a TIFF the decoder understands.
    #[error("cannot decode GeoTIFF: {0}")]
    Decode(#[from] tiff::TiffError),

    /// The TIFF decoded but holds no usable first band.
    #[error("unsupported raster layout: {0}")]
    Unsupported(String),

    #[error("cannot encode image: {0}")]
    Encode(#[from] image::ImageError),
}

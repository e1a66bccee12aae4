//! `raster` crate — GeoTIFF decoding, normalization, water body counting,
//! and heatmap rendering.
//!
//! Everything here is synchronous and CPU bound; async callers should run it
//! on a blocking thread.

pub mod models;
pub mod error;
pub mod geotiff;
pub mod label;
pub mod analysis;
pub mod heatmap;

pub use models::{Bounds, Grid, Mask, RasterImage, RasterMetadata};
pub use error::RasterError;
pub use geotiff::read_geotiff;
pub use label::{label_components, Labeling};
pub use analysis::{analyze, count_water_bodies, normalize, threshold_mask, RasterAnalysis, WATER_THRESHOLD};
pub use heatmap::render_heatmap_png;

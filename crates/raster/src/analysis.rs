//! Normalization and the water body count.
//!
//! A raster is normalized to `[0, 1]` over its finite range, thresholded at
//! [`WATER_THRESHOLD`], and the 4-connected components of the result are
//! counted.  The same bytes always give the same count.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::label::label_components;
use crate::{read_geotiff, Grid, Mask, RasterError, RasterMetadata};

/// Normalized values strictly above this are treated as water.
pub const WATER_THRESHOLD: f64 = 0.5;

/// Rescale to `(v - min) / (max - min)` over the non-`NaN` cells.
///
/// `NaN` cells stay `NaN`.  A grid with no spread (constant, or entirely
/// `NaN`) has no meaningful scale and normalizes to all `NaN`.
pub fn normalize(grid: &Grid) -> Grid {
    let values = match grid.finite_range() {
        Some((lo, hi)) if hi > lo => {
            let span = hi - lo;
            grid.values.iter().map(|v| (v - lo) / span).collect()
        }
        _ => vec![f64::NAN; grid.values.len()],
    };
    Grid { width: grid.width, height: grid.height, values }
}

/// Cells with a value strictly greater than `threshold`.  `NaN` is never set.
pub fn threshold_mask(grid: &Grid, threshold: f64) -> Mask {
    Mask {
        width: grid.width,
        height: grid.height,
        cells: grid.values.iter().map(|&v| v > threshold).collect(),
    }
}

/// Number of water bodies in an already normalized grid.
pub fn count_water_bodies(normalized: &Grid) -> usize {
    label_components(&threshold_mask(normalized, WATER_THRESHOLD)).count
}

/// Everything the viewer reports for one raster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterAnalysis {
    pub metadata: RasterMetadata,
    pub water_body_count: usize,
    /// Finite value range of the first band before normalization.
    pub value_range: Option<(f64, f64)>,
    /// Centre of the bounds, used to place the raster on the map.
    pub center: (f64, f64),
    /// Heatmap axis ticks: one x coordinate per column, left to right.
    pub x_coords: Vec<f64>,
    /// One y coordinate per row, bottom to top.
    pub y_coords: Vec<f64>,
}

/// Decode, normalize, and count water bodies in one go.
pub fn analyze(bytes: &[u8]) -> Result<RasterAnalysis, RasterError> {
    let image = read_geotiff(bytes)?;
    let value_range = image.grid.finite_range();
    let water_body_count = count_water_bodies(&normalize(&image.grid));
    info!(
        width = image.metadata.width,
        height = image.metadata.height,
        water_body_count,
        "analysed raster"
    );
    let bounds = image.metadata.bounds;
    Ok(RasterAnalysis {
        center: bounds.center(),
        x_coords: bounds.x_coords(image.metadata.width),
        y_coords: bounds.y_coords(image.metadata.height),
        metadata: image.metadata,
        water_body_count,
        value_range,
    })
}

//! Core raster types.
//!
//! Grids are row-major with row 0 at the north edge, matching how the
//! GeoTIFF stores its first band.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// A single band of samples.  Missing data is `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    pub values: Vec<f64>,
}

impl Grid {
    /// Build a grid from row-major values.  Returns `None` when the length
    /// does not match the dimensions.
    pub fn new(width: usize, height: usize, values: Vec<f64>) -> Option<Self> {
        (values.len() == width * height).then_some(Self { width, height, values })
    }

    /// Build a grid from nested rows, convenient in tests.
    pub fn from_rows(rows: &[&[f64]]) -> Option<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        if rows.iter().any(|r| r.len() != width) {
            return None;
        }
        Self::new(width, height, rows.iter().flat_map(|r| r.iter().copied()).collect())
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.width + col]
    }

    /// Smallest and largest non-`NaN` values, `None` if every cell is `NaN`.
    pub fn finite_range(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

// ---------------------------------------------------------------------------
// Mask
// ---------------------------------------------------------------------------

/// Binary foreground mask with the same layout as [`Grid`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<bool>,
}

impl Mask {
    /// Parse a mask from strings of `#` (foreground) and `.` (background).
    pub fn from_pattern(rows: &[&str]) -> Option<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.chars().count());
        let mut cells = Vec::with_capacity(width * height);
        for row in rows {
            if row.chars().count() != width {
                return None;
            }
            cells.extend(row.chars().map(|c| c == '#'));
        }
        Some(Self { width, height, cells })
    }

    pub fn is_set(&self, row: usize, col: usize) -> bool {
        self.cells[row * self.width + col]
    }
}

// ---------------------------------------------------------------------------
// Georeferencing
// ---------------------------------------------------------------------------

/// Spatial extent in the raster's coordinate reference system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
}

impl Bounds {
    /// Pixel-space bounds for rasters without georeferencing tags.
    pub fn pixel_space(width: usize, height: usize) -> Self {
        Self { left: 0.0, bottom: 0.0, right: width as f64, top: height as f64 }
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.left + self.right) / 2.0, (self.bottom + self.top) / 2.0)
    }

    /// Evenly spaced x coordinates, one per column, from left to right.
    pub fn x_coords(&self, width: usize) -> Vec<f64> {
        linspace(self.left, self.right, width)
    }

    /// Evenly spaced y coordinates, one per row, from bottom to top.
    pub fn y_coords(&self, height: usize) -> Vec<f64> {
        linspace(self.bottom, self.top, height)
    }
}

fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// What the viewer shows next to each heatmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterMetadata {
    pub driver: String,
    pub width: usize,
    pub height: usize,
    /// Samples per pixel in the file; only the first is analysed.
    pub band_count: usize,
    pub dtype: String,
    pub nodata: Option<f64>,
    pub bounds: Bounds,
    /// Ground size of one pixel `(x, y)`, when georeferenced.
    pub pixel_size: Option<(f64, f64)>,
}

/// A decoded first band plus its metadata.
#[derive(Debug, Clone)]
pub struct RasterImage {
    pub grid: Grid,
    pub metadata: RasterMetadata,
}

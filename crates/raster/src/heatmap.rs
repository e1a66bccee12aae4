//! Heatmap rendering of a normalized grid.
//!
//! One output pixel per raster cell on the Viridis scale; `NaN` cells are
//! fully transparent.  Row 0 is drawn at the top so north stays up.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use plotters::prelude::ViridisRGB;

use crate::{Grid, RasterError};

/// Colour for a normalized value; values outside `[0, 1]` are clamped.
pub fn viridis(value: f64) -> Rgba<u8> {
    if value.is_nan() {
        return Rgba([0, 0, 0, 0]);
    }
    let color = ViridisRGB::get_color(value.clamp(0.0, 1.0));
    Rgba([color.0, color.1, color.2, 255])
}

/// Encode the grid as a PNG heatmap.
pub fn render_heatmap_png(normalized: &Grid) -> Result<Vec<u8>, RasterError> {
    if normalized.width == 0 || normalized.height == 0 {
        return Err(RasterError::Unsupported("cannot render an empty raster".into()));
    }
    let image = RgbaImage::from_fn(normalized.width as u32, normalized.height as u32, |x, y| {
        viridis(normalized.get(y as usize, x as usize))
    });

    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_endpoints_match_viridis() {
        assert_eq!(viridis(0.0), Rgba([68, 1, 84, 255]));
        assert_eq!(viridis(1.0), Rgba([254, 232, 37, 255]));
        assert_eq!(viridis(-3.0), viridis(0.0));
        assert_eq!(viridis(7.0), viridis(1.0));
        assert_eq!(viridis(f64::NAN)[3], 0);
    }

    #[test]
    fn png_has_raster_dimensions() {
        let grid = Grid::from_rows(&[&[0.0, 0.5, 1.0], &[f64::NAN, 0.25, 0.75]]).unwrap();
        let png = render_heatmap_png(&grid).unwrap();

        let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png)
            .unwrap()
            .to_rgba8();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(0, 1)[3], 0);
        assert_eq!(*decoded.get_pixel(2, 0), viridis(1.0));
    }
}

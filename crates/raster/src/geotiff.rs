//! GeoTIFF decoding.
//!
//! Only the first band of the first image is read.  Georeferencing comes from
//! the GeoTIFF model tags; the nodata marker from the GDAL tag.

use std::io::Cursor;

use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tracing::debug;

use crate::{Bounds, Grid, RasterError, RasterImage, RasterMetadata};

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const MODEL_TRANSFORMATION: u16 = 34264;
const GDAL_NODATA: u16 = 42113;

/// Resolve a numeric tag to whichever variant the decoder files it under.
fn tag(code: u16) -> Tag {
    Tag::from_u16_exhaustive(code)
}

/// Decode the first band of a GeoTIFF held in memory.
///
/// Cells equal to the nodata value are replaced by `NaN`.
pub fn read_geotiff(bytes: &[u8]) -> Result<RasterImage, RasterError> {
    let mut decoder = Decoder::new(Cursor::new(bytes))?;
    let (width, height) = decoder.dimensions()?;
    let (width, height) = (width as usize, height as usize);
    if width == 0 || height == 0 {
        return Err(RasterError::Unsupported("raster has no pixels".into()));
    }

    let transform = read_transform(&mut decoder)?;
    let nodata = read_nodata(&mut decoder)?;

    let (samples, dtype) = samples_as_f64(decoder.read_image()?)?;
    let pixels = width * height;
    if samples.len() < pixels || samples.len() % pixels != 0 {
        return Err(RasterError::Unsupported(format!(
            "{} samples do not fit a {width}x{height} raster",
            samples.len()
        )));
    }
    let band_count = samples.len() / pixels;

    let mut values: Vec<f64> = samples.into_iter().step_by(band_count).collect();
    if let Some(marker) = nodata {
        for v in values.iter_mut().filter(|v| **v == marker) {
            *v = f64::NAN;
        }
    }

    let (bounds, pixel_size) = match transform {
        Some(t) => (t.bounds(width, height), Some((t.scale_x, t.scale_y))),
        None => (Bounds::pixel_space(width, height), None),
    };
    debug!(width, height, band_count, dtype, ?bounds, "decoded GeoTIFF");

    let grid = Grid { width, height, values };
    let metadata = RasterMetadata {
        driver: "GTiff".into(),
        width,
        height,
        band_count,
        dtype: dtype.into(),
        nodata,
        bounds,
        pixel_size,
    };
    Ok(RasterImage { grid, metadata })
}

/// Affine mapping of the top-left pixel corner plus pixel size.
#[derive(Debug, Clone, Copy, PartialEq)]
struct GeoTransform {
    origin_x: f64,
    origin_y: f64,
    scale_x: f64,
    scale_y: f64,
}

impl GeoTransform {
    fn bounds(&self, width: usize, height: usize) -> Bounds {
        Bounds {
            left: self.origin_x,
            top: self.origin_y,
            right: self.origin_x + self.scale_x * width as f64,
            bottom: self.origin_y - self.scale_y * height as f64,
        }
    }
}

fn read_transform(
    decoder: &mut Decoder<Cursor<&[u8]>>,
) -> Result<Option<GeoTransform>, RasterError> {
    let scale = decoder.find_tag(tag(MODEL_PIXEL_SCALE))?.map(|v| v.into_f64_vec()).transpose()?;
    let tiepoint = decoder.find_tag(tag(MODEL_TIEPOINT))?.map(|v| v.into_f64_vec()).transpose()?;

    if let (Some(scale), Some(tie)) = (scale, tiepoint) {
        if scale.len() >= 2 && tie.len() >= 6 {
            let (i, j, x, y) = (tie[0], tie[1], tie[3], tie[4]);
            return Ok(Some(GeoTransform {
                origin_x: x - i * scale[0],
                origin_y: y + j * scale[1],
                scale_x: scale[0],
                scale_y: scale[1],
            }));
        }
    }

    let matrix = decoder.find_tag(tag(MODEL_TRANSFORMATION))?.map(|v| v.into_f64_vec()).transpose()?;
    Ok(matrix.filter(|m| m.len() >= 8).map(|m| GeoTransform {
        origin_x: m[3],
        origin_y: m[7],
        scale_x: m[0],
        scale_y: -m[5],
    }))
}

fn read_nodata(decoder: &mut Decoder<Cursor<&[u8]>>) -> Result<Option<f64>, RasterError> {
    let Some(value) = decoder.find_tag(tag(GDAL_NODATA))? else {
        return Ok(None);
    };
    let text = value.into_string()?;
    let text = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    match text.to_ascii_lowercase().as_str() {
        "nan" => Ok(None),
        other => Ok(other.parse::<f64>().ok()),
    }
}

fn samples_as_f64(result: DecodingResult) -> Result<(Vec<f64>, &'static str), RasterError> {
    fn widen<T: Copy + Into<f64>>(v: Vec<T>) -> Vec<f64> {
        v.into_iter().map(Into::into).collect()
    }

    Ok(match result {
        DecodingResult::U8(v) => (widen(v), "uint8"),
        DecodingResult::U16(v) => (widen(v), "uint16"),
        DecodingResult::U32(v) => (widen(v), "uint32"),
        DecodingResult::U64(v) => (v.into_iter().map(|x| x as f64).collect(), "uint64"),
        DecodingResult::I8(v) => (widen(v), "int8"),
        DecodingResult::I16(v) => (widen(v), "int16"),
        DecodingResult::I32(v) => (widen(v), "int32"),
        DecodingResult::I64(v) => (v.into_iter().map(|x| x as f64).collect(), "int64"),
        DecodingResult::F32(v) => (widen(v), "float32"),
        DecodingResult::F64(v) => (v, "float64"),
        #[allow(unreachable_patterns)]
        _ => return Err(RasterError::Unsupported("sample format".into())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiff::encoder::{colortype, TiffEncoder};

    fn encode_gray_f32(width: u32, height: u32, data: &[f32]) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        TiffEncoder::new(&mut buf)
            .unwrap()
            .write_image::<colortype::Gray32Float>(width, height, data)
            .unwrap();
        buf.into_inner()
    }

    fn encode_georeferenced(width: u32, height: u32, data: &[f32], nodata: &str) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut tiff = TiffEncoder::new(&mut buf).unwrap();
            let mut image = tiff.new_image::<colortype::Gray32Float>(width, height).unwrap();
            image.encoder().write_tag(tag(MODEL_PIXEL_SCALE), &[0.5f64, 0.25, 0.0][..]).unwrap();
            image
                .encoder()
                .write_tag(tag(MODEL_TIEPOINT), &[0.0f64, 0.0, 0.0, 28.5, -20.1, 0.0][..])
                .unwrap();
            image.encoder().write_tag(tag(GDAL_NODATA), nodata).unwrap();
            image.write_data(data).unwrap();
        }
        buf.into_inner()
    }

    #[test]
    fn plain_tiff_uses_pixel_space_bounds() {
        let bytes = encode_gray_f32(3, 2, &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        let image = read_geotiff(&bytes).unwrap();

        assert_eq!(image.grid.width, 3);
        assert_eq!(image.grid.height, 2);
        assert_eq!(image.grid.get(1, 2), 5.0);
        assert_eq!(image.metadata.dtype, "float32");
        assert_eq!(image.metadata.band_count, 1);
        assert_eq!(image.metadata.bounds, Bounds::pixel_space(3, 2));
        assert_eq!(image.metadata.pixel_size, None);
    }

    #[test]
    fn model_tags_give_bounds_and_nodata() {
        let bytes = encode_georeferenced(4, 2, &[1.0, -9999.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0], "-9999");
        let image = read_geotiff(&bytes).unwrap();

        let b = image.metadata.bounds;
        assert_eq!(b.left, 28.5);
        assert_eq!(b.top, -20.1);
        assert!((b.right - 30.5).abs() < 1e-9);
        assert!((b.bottom - (-20.6)).abs() < 1e-9);
        assert_eq!(image.metadata.nodata, Some(-9999.0));
        assert!(image.grid.get(0, 1).is_nan());
        assert_eq!(image.grid.get(0, 0), 1.0);
    }

    #[test]
    fn eight_bit_rgb_keeps_first_sample() {
        let mut buf = Cursor::new(Vec::new());
        TiffEncoder::new(&mut buf)
            .unwrap()
            .write_image::<colortype::RGB8>(2, 1, &[10, 20, 30, 40, 50, 60])
            .unwrap();

        let image = read_geotiff(&buf.into_inner()).unwrap();
        assert_eq!(image.metadata.band_count, 3);
        assert_eq!(image.grid.values, vec![10.0, 40.0]);
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(read_geotiff(b"not a tiff"), Err(RasterError::Decode(_))));
    }
}

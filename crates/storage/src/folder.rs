//! The three upload folders and what each accepts.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::StorageError;

/// One of the flat upload folders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderKind {
    /// GeoTIFF uploads from the admin console, read by the viewer.
    Rasters,
    /// Excel workbooks holding the water body dataset.
    Datasets,
    /// Map files submitted by external contributors.
    Contributions,
}

impl FolderKind {
    pub const ALL: [FolderKind; 3] = [Self::Rasters, Self::Datasets, Self::Contributions];

    /// Extensions accepted when a file is uploaded into this folder.
    pub fn upload_extensions(self) -> &'static [&'static str] {
        match self {
            Self::Rasters => &["tif", "tiff"],
            Self::Datasets => &["xlsx"],
            Self::Contributions => &["shp", "geojson", "dxf", "csv", "tif", "tiff"],
        }
    }

    /// Extensions shown when the folder is browsed.
    ///
    /// Contributions are browsed with a different set than they are accepted
    /// with; images dropped into the folder by hand are shown as well.
    pub fn listing_extensions(self) -> &'static [&'static str] {
        match self {
            Self::Rasters => &["tif", "tiff"],
            Self::Datasets => &["xlsx"],
            Self::Contributions => &["tif", "tiff", "shp", "dxf", "png", "jpg", "jpeg"],
        }
    }

    pub fn accepts_upload(self, name: &str) -> bool {
        has_extension(name, self.upload_extensions())
    }

    pub fn is_listed(self, name: &str) -> bool {
        has_extension(name, self.listing_extensions())
    }
}

impl fmt::Display for FolderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rasters => write!(f, "rasters"),
            Self::Datasets => write!(f, "datasets"),
            Self::Contributions => write!(f, "contributions"),
        }
    }
}

/// Lower-cased extension of `name`, if any.
pub fn extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

fn has_extension(name: &str, allowed: &[&str]) -> bool {
    extension(name).is_some_and(|ext| allowed.contains(&ext.as_str()))
}

/// Reject names that are empty or would leave the folder.
///
/// Names are otherwise used literally: no renaming, no collision handling.
pub fn validate_name(name: &str) -> Result<(), StorageError> {
    let bad = name.trim().is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0'])
        || name.split('.').all(str::is_empty);
    if bad {
        return Err(StorageError::InvalidName(name.to_owned()));
    }
    Ok(())
}

/// Content type for downloads, detected from the file extension.
pub fn detect_mime(name: &str) -> &'static str {
    match extension(name).as_deref() {
        Some("tif" | "tiff") => "image/tiff",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("csv") => "text/csv",
        Some("geojson") => "application/geo+json",
        Some("dxf") => "image/vnd.dxf",
        _ => "application/octet-stream",
    }
}

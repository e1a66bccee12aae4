//! Dashboard settings.
//!
//! Read from an optional TOML file; every field has a default so an empty or
//! absent file yields a working local setup.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Settings shared by the admin console and the public viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Uploaded GeoTIFFs.
    pub raster_dir: PathBuf,
    /// Excel datasets.
    pub dataset_dir: PathBuf,
    /// Map files submitted through the viewer.
    pub contributions_dir: PathBuf,
    pub database_url: String,
    /// Dataset file the viewer reads water body sizes from.
    pub water_body_dataset: String,
    /// Largest accepted request body.
    pub max_upload_bytes: usize,
    /// Static UI served for paths no route matches.
    pub web_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            raster_dir: PathBuf::from("uploaded_files"),
            dataset_dir: PathBuf::from("datasets"),
            contributions_dir: PathBuf::from("contributions"),
            database_url: "sqlite://contributions.db".into(),
            water_body_dataset: "water_body_sizes.xlsx".into(),
            max_upload_bytes: 200 * 1024 * 1024,
            web_dir: None,
        }
    }
}

impl Settings {
    /// Load settings from `path`, or the defaults when no path is given.
    pub async fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            tracing::debug!("no settings file given, using defaults");
            return Ok(Self::default());
        };

        let content = tokio::fs::read_to_string(path).await.map_err(|source| {
            ConfigError::Read { path: path.to_path_buf(), source }
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn no_path_gives_defaults() {
        let settings = Settings::load(None).await.unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.raster_dir, PathBuf::from("uploaded_files"));
    }

    #[tokio::test]
    async fn partial_file_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("adapt.toml");
        tokio::fs::write(
            &path,
            r#"
database_url = "sqlite:///srv/adapt/contributions.db"
web_dir = "/srv/adapt/web"
"#,
        )
        .await
        .unwrap();

        let settings = Settings::load(Some(&path)).await.unwrap();
        assert_eq!(settings.database_url, "sqlite:///srv/adapt/contributions.db");
        assert_eq!(settings.web_dir, Some(PathBuf::from("/srv/adapt/web")));
        assert_eq!(settings.dataset_dir, PathBuf::from("datasets"));
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = Settings::load(Some(&tmp.path().join("absent.toml"))).await.unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_toml_is_rejected() {
        assert!(Settings::from_toml("max_upload_bytes = \"lots\"").is_err());
    }
}

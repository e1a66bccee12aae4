//! Map contributions from the public viewer.
//!
//! A submission is stored as `<map name><upload extension>` in the
//! contributions folder and appended to the log under the submitter's name
//! and email.  Resubmitting the same map name overwrites the file and adds a
//! second row.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use db::{repository::contributions as contribution_repo, ContributionRow, NewContribution};
use storage::{detect_mime, folder::validate_name, FolderKind, StoredFile};

use crate::{Portal, ServiceError};

/// Form fields of a contribution submission.
#[derive(Debug, Clone, Default)]
pub struct ContributionForm {
    pub map_name: String,
    pub contributor: String,
    pub email: String,
    /// Name of the uploaded file; only its extension is kept.
    pub upload_name: String,
    pub bytes: Vec<u8>,
}

impl ContributionForm {
    /// Check required fields and derive the stored file name.
    pub fn stored_name(&self) -> Result<String, ServiceError> {
        if self.upload_name.trim().is_empty() {
            return Err(ServiceError::Validation("Please choose a file to upload.".into()));
        }
        if [&self.map_name, &self.contributor, &self.email]
            .iter()
            .any(|f| f.trim().is_empty())
        {
            return Err(ServiceError::Validation(
                "Please enter all fields: Map Name, Contributor Name, and Contributor Email.".into(),
            ));
        }
        if !FolderKind::Contributions.accepts_upload(&self.upload_name) {
            return Err(ServiceError::Validation(format!(
                "'{}' is not an accepted map format ({})",
                self.upload_name,
                FolderKind::Contributions.upload_extensions().join(", ")
            )));
        }

        let extension = self
            .upload_name
            .rfind('.')
            .map(|i| &self.upload_name[i..])
            .unwrap_or_default();
        let stored = format!("{}{}", self.map_name.trim(), extension);
        validate_name(&stored)?;
        Ok(stored)
    }
}

/// A browsable file in the contributions folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributionFile {
    #[serde(flatten)]
    pub file: StoredFile,
    pub size_kb: f64,
    pub mime: String,
    /// Whether the admin console can show the file inline.
    pub previewable: bool,
}

impl From<StoredFile> for ContributionFile {
    fn from(file: StoredFile) -> Self {
        let mime = detect_mime(&file.name);
        Self {
            size_kb: file.size_kb(),
            previewable: matches!(mime, "image/png" | "image/jpeg"),
            mime: mime.to_owned(),
            file,
        }
    }
}

/// Selection label for a logged contribution: `"{map} by {contributor} on {timestamp}"`.
///
/// The older dashboard put the email after "on"; the timestamp is used here
/// instead, so the email never appears in the public list.
pub fn label(row: &ContributionRow) -> String {
    format!("{} by {} on {}", row.map_name, row.contributor, row.timestamp)
}

impl Portal {
    /// Store a contributed map and log it.
    #[instrument(skip(self, form), fields(map_name = %form.map_name, bytes = form.bytes.len()))]
    pub async fn submit_contribution(
        &self,
        form: &ContributionForm,
    ) -> Result<ContributionRow, ServiceError> {
        let stored_name = form.stored_name()?;
        let path = self
            .store()
            .save(FolderKind::Contributions, &stored_name, &form.bytes)
            .await?;

        let row = contribution_repo::insert_contribution(
            self.pool(),
            &NewContribution::now(
                form.map_name.trim(),
                form.contributor.trim(),
                form.email.trim(),
                path.to_string_lossy(),
            ),
        )
        .await?;

        info!(id = row.id, stored_name, "contribution received");
        Ok(row)
    }

    /// Every logged contribution, oldest first.
    pub async fn contributions(&self) -> Result<Vec<ContributionRow>, ServiceError> {
        Ok(contribution_repo::list_contributions(self.pool()).await?)
    }

    pub async fn contribution(&self, id: i64) -> Result<ContributionRow, ServiceError> {
        Ok(contribution_repo::get_contribution(self.pool(), id).await?)
    }

    /// Files currently in the contributions folder.
    pub async fn contribution_files(&self) -> Result<Vec<ContributionFile>, ServiceError> {
        Ok(self
            .listed_files(FolderKind::Contributions)
            .await?
            .into_iter()
            .map(ContributionFile::from)
            .collect())
    }

    /// Bytes and content type of a contributed file.
    pub async fn download_contribution(
        &self,
        file_name: &str,
    ) -> Result<(Vec<u8>, &'static str), ServiceError> {
        let bytes = self.store().read(FolderKind::Contributions, file_name).await?;
        Ok((bytes, detect_mime(file_name)))
    }

    /// Remove a contributed file.  Its log row is kept.
    pub async fn delete_contribution_file(&self, file_name: &str) -> Result<(), ServiceError> {
        self.store().delete(FolderKind::Contributions, file_name).await?;
        info!(file_name, "contribution file deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ContributionForm {
        ContributionForm {
            map_name: "Umguza wetlands".into(),
            contributor: "Nomsa".into(),
            email: "nomsa@example.com".into(),
            upload_name: "export.final.GeoJSON".into(),
            bytes: b"{}".to_vec(),
        }
    }

    #[test]
    fn stored_name_keeps_upload_extension() {
        assert_eq!(form().stored_name().unwrap(), "Umguza wetlands.GeoJSON");
    }

    #[test]
    fn blank_fields_are_rejected() {
        for blank in 0..3 {
            let mut f = form();
            match blank {
                0 => f.map_name = " ".into(),
                1 => f.contributor.clear(),
                _ => f.email.clear(),
            }
            assert!(matches!(f.stored_name(), Err(ServiceError::Validation(_))));
        }
    }

    #[test]
    fn missing_file_is_rejected() {
        let f = ContributionForm { upload_name: String::new(), ..form() };
        assert!(matches!(f.stored_name(), Err(ServiceError::Validation(_))));
    }

    #[test]
    fn unsupported_format_is_rejected() {
        let f = ContributionForm { upload_name: "photo.png".into(), ..form() };
        assert!(matches!(f.stored_name(), Err(ServiceError::Validation(_))));
    }

    #[test]
    fn map_name_cannot_escape_folder() {
        let f = ContributionForm { map_name: "../../etc/x".into(), ..form() };
        assert!(matches!(f.stored_name(), Err(ServiceError::Storage(_))));
    }

    #[test]
    fn images_are_previewable() {
        let file = StoredFile {
            name: "sketch.JPG".into(),
            size_bytes: 2048,
            modified: chrono::Utc::now(),
        };
        let browsed = ContributionFile::from(file);
        assert!(browsed.previewable);
        assert_eq!(browsed.size_kb, 2.0);
    }

    #[test]
    fn label_ends_with_timestamp_not_email() {
        let row = ContributionRow {
            id: 7,
            map_name: "Umguza wetlands".into(),
            contributor: "Nomsa".into(),
            email: "nomsa@example.com".into(),
            timestamp: "2024-10-19T08:30:00.000000Z".into(),
            file_path: "contributions/Umguza wetlands.GeoJSON".into(),
        };
        let label = label(&row);
        assert_eq!(label, "Umguza wetlands by Nomsa on 2024-10-19T08:30:00.000000Z");
        assert!(!label.contains("nomsa@example.com"));
    }
}

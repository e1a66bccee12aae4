//! Multipart form collection.

use std::collections::HashMap;

use axum::extract::Multipart;

use crate::error::AppError;

/// File part of an upload form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Text fields plus the part named `file`.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub fields: HashMap<String, String>,
    pub file: Option<UploadedFile>,
}

impl UploadForm {
    /// Drain a multipart body.  Unnamed parts are skipped.
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            if name == "file" {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let bytes = field.bytes().await?;
                form.file = Some(UploadedFile { name: file_name, bytes: bytes.to_vec() });
            } else {
                form.fields.insert(name, field.text().await?);
            }
        }
        Ok(form)
    }

    pub fn field(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    /// The uploaded file, which must have a name.
    pub fn require_file(self) -> Result<UploadedFile, AppError> {
        self.file
            .filter(|f| !f.name.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest("a file is required".into()))
    }
}

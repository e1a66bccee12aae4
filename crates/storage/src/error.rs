//! Error type shared by every `FileStore` implementation.

use thiserror::Error;

use crate::FolderKind;

#[derive(Debug, Error)]
pub enum StorageError {
    /// The name would address something outside its folder.
    #[error("invalid file name: '{0}'")]
    InvalidName(String),

    #[error("'{name}' not found in {folder}")]
    NotFound { folder: FolderKind, name: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

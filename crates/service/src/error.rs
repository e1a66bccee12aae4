//! Service-level error types.

use thiserror::Error;

/// Errors produced by the dashboard workflows.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request is missing something or carries the wrong kind of file.
    #[error("{0}")]
    Validation(String),

    /// The Excel workbook could not be read or lacks expected columns.
    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("chart rendering failed: {0}")]
    Chart(String),

    #[error(transparent)]
    Storage(#[from] storage::StorageError),

    #[error("database error: {0}")]
    Database(#[from] db::DbError),

    #[error(transparent)]
    Raster(#[from] raster::RasterError),

    /// A blocking task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

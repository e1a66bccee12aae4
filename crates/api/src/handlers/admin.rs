//! Admin console handlers: raster and dataset management, contribution files,
//! and the contribution metrics.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use tracing::info;

use service::{ContributionFile, DatasetTable, Kpis, SizeSeriesPoint, UploadReceipt};
use storage::StoredFile;

use super::form::UploadForm;
use super::{file_response, svg_response, SearchQuery};
use crate::error::AppError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Rasters
// ---------------------------------------------------------------------------

pub async fn upload_raster(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadReceipt>), AppError> {
    let file = UploadForm::read(multipart).await?.require_file()?;
    let receipt = state.portal.upload_raster(&file.name, &file.bytes).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

pub async fn list_rasters(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<StoredFile>>, AppError> {
    Ok(Json(state.portal.list_rasters(query.search.as_deref()).await?))
}

pub async fn delete_raster(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    state.portal.delete_raster(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Datasets
// ---------------------------------------------------------------------------

pub async fn list_datasets(
    State(state): State<AppState>,
) -> Result<Json<Vec<StoredFile>>, AppError> {
    Ok(Json(state.portal.list_datasets().await?))
}

#[derive(Debug, serde::Serialize)]
pub struct DatasetSaved {
    pub file_name: String,
}

/// Multipart `name` and `file`; stored as `<name>.xlsx`.
pub async fn upload_dataset(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<DatasetSaved>), AppError> {
    let form = UploadForm::read(multipart).await?;
    let name = form.field("name");
    let file = form.require_file()?;
    let file_name = state.portal.replace_dataset(&name, &file.bytes).await?;
    Ok((StatusCode::CREATED, Json(DatasetSaved { file_name })))
}

pub async fn get_dataset(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<DatasetTable>, AppError> {
    Ok(Json(state.portal.dataset_table(&name).await?))
}

pub async fn delete_dataset(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    state.portal.delete_dataset(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Contribution files
// ---------------------------------------------------------------------------

pub async fn contribution_files(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContributionFile>>, AppError> {
    Ok(Json(state.portal.contribution_files().await?))
}

pub async fn download_contribution_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let (bytes, mime) = state.portal.download_contribution(&name).await?;
    Ok(file_response(&name, bytes, mime))
}

pub async fn delete_contribution_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    state.portal.delete_contribution_file(&name).await?;
    info!(name, "contribution file removed from admin console");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

pub async fn metrics(State(state): State<AppState>) -> Result<Json<Kpis>, AppError> {
    Ok(Json(state.portal.kpis().await?))
}

pub async fn size_over_time(
    State(state): State<AppState>,
) -> Result<Json<Vec<SizeSeriesPoint>>, AppError> {
    Ok(Json(state.portal.size_over_time().await?))
}

pub async fn size_over_time_chart(State(state): State<AppState>) -> Result<Response, AppError> {
    Ok(svg_response(state.portal.size_over_time_chart().await?))
}

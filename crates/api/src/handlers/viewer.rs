//! Public viewer handlers.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use db::ContributionRow;
use raster::RasterAnalysis;
use service::datasets::{area_range, unique_names};
use service::{ContributionForm, Kpis, WaterBodyFilter, WaterBodyRecord};
use storage::{detect_mime, StoredFile};

use super::form::UploadForm;
use super::{file_response, svg_response, SearchQuery};
use crate::error::AppError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Rasters
// ---------------------------------------------------------------------------

pub async fn list_rasters(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<StoredFile>>, AppError> {
    Ok(Json(state.portal.browse_rasters(query.search.as_deref()).await?))
}

pub async fn download_raster(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let bytes = state.portal.read_raster(&name).await?;
    Ok(file_response(&name, bytes, detect_mime(&name)))
}

pub async fn raster_analysis(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<RasterAnalysis>, AppError> {
    Ok(Json(state.portal.analyze_raster(&name).await?))
}

pub async fn raster_heatmap(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let png = state.portal.raster_heatmap(&name).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

// ---------------------------------------------------------------------------
// Water bodies
// ---------------------------------------------------------------------------

/// `?names=a&names=b&min_area=&max_area=`
///
/// Each `names` value selects one water body by its exact name, so names
/// containing commas stay selectable.  Blank values are ignored.
#[derive(Debug, Default)]
pub struct WaterBodyQuery(pub WaterBodyFilter);

impl TryFrom<Vec<(String, String)>> for WaterBodyQuery {
    type Error = AppError;

    fn try_from(params: Vec<(String, String)>) -> Result<Self, AppError> {
        let mut filter = WaterBodyFilter::default();
        for (key, value) in params {
            let value = value.trim();
            match key.as_str() {
                "names" if !value.is_empty() => filter.names.push(value.to_owned()),
                "min_area" => filter.min_area = parse_area(&key, value)?,
                "max_area" => filter.max_area = parse_area(&key, value)?,
                _ => {}
            }
        }
        Ok(Self(filter))
    }
}

fn parse_area(key: &str, value: &str) -> Result<Option<f64>, AppError> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| AppError::BadRequest(format!("'{key}' must be a number, got '{value}'")))
}

/// Filter choices alongside the matching records.
#[derive(Debug, Serialize)]
pub struct WaterBodiesView {
    pub names: Vec<String>,
    pub area_range: Option<(f64, f64)>,
    pub records: Vec<WaterBodyRecord>,
}

pub async fn water_bodies(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<WaterBodiesView>, AppError> {
    let WaterBodyQuery(filter) = WaterBodyQuery::try_from(params)?;
    let all = state
        .portal
        .water_body_records(&state.settings.water_body_dataset)
        .await?;
    Ok(Json(WaterBodiesView {
        names: unique_names(&all),
        area_range: area_range(&all),
        records: filter.apply(&all),
    }))
}

pub async fn water_body_chart(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let WaterBodyQuery(filter) = WaterBodyQuery::try_from(params)?;
    let svg = state
        .portal
        .water_body_chart(&state.settings.water_body_dataset, &filter)
        .await?;
    Ok(svg_response(svg))
}

pub async fn water_body_share_chart(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, AppError> {
    let WaterBodyQuery(filter) = WaterBodyQuery::try_from(params)?;
    let svg = state
        .portal
        .water_body_share_chart(&state.settings.water_body_dataset, &filter)
        .await?;
    Ok(svg_response(svg))
}

// ---------------------------------------------------------------------------
// Contributions
// ---------------------------------------------------------------------------

/// Multipart `map_name`, `contributor`, `email`, and `file`.
pub async fn submit_contribution(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ContributionRow>), AppError> {
    let form = UploadForm::read(multipart).await?;
    let contribution = ContributionForm {
        map_name: form.field("map_name"),
        contributor: form.field("contributor"),
        email: form.field("email"),
        upload_name: form.file.as_ref().map(|f| f.name.clone()).unwrap_or_default(),
        bytes: form.file.map(|f| f.bytes).unwrap_or_default(),
    };
    let row = state.portal.submit_contribution(&contribution).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

#[derive(Debug, Serialize)]
pub struct ContributionEntry {
    #[serde(flatten)]
    pub row: ContributionRow,
    pub label: String,
}

pub async fn contributions(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContributionEntry>>, AppError> {
    let entries = state
        .portal
        .contributions()
        .await?
        .into_iter()
        .map(|row| ContributionEntry { label: service::contributions::label(&row), row })
        .collect();
    Ok(Json(entries))
}

pub async fn metrics(State(state): State<AppState>) -> Result<Json<Kpis>, AppError> {
    Ok(Json(state.portal.kpis().await?))
}

//! Excel dataset management and the water body table.
//!
//! Dataset files live in the dataset folder as `<name>.xlsx`.  Only the first
//! worksheet is read, and its first row is taken as the header.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use serde::{Deserialize, Serialize};
use tracing::info;

use storage::{FolderKind, StoredFile};

use crate::{Portal, ServiceError};

pub const NAME_COLUMN: &str = "water body name";
pub const AREA_COLUMN: &str = "area (square meters)";
pub const PURPOSE_COLUMN: &str = "use/ purpose";
pub const LATITUDE_COLUMN: &str = "latitude";
pub const LONGITUDE_COLUMN: &str = "longitude";

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// One spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Bool(b) => Some(b.to_string()),
            Self::Number(n) => Some(n.to_string()),
            Self::Text(s) => Some(s.clone()).filter(|s| !s.trim().is_empty()),
        }
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Self::Empty,
            Data::Bool(b) => Self::Bool(*b),
            Data::Int(i) => Self::Number(*i as f64),
            Data::Float(f) => Self::Number(*f),
            Data::String(s) => Self::Text(s.clone()),
            other => Self::Text(other.to_string()),
        }
    }
}

/// First worksheet of a workbook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl DatasetTable {
    /// Parse an `.xlsx` workbook held in memory.
    pub fn from_xlsx(bytes: &[u8]) -> Result<Self, ServiceError> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
            .map_err(|e| ServiceError::Dataset(e.to_string()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ServiceError::Dataset("workbook has no worksheets".into()))?
            .map_err(|e| ServiceError::Dataset(e.to_string()))?;

        let mut rows = range.rows();
        let headers = rows
            .next()
            .map(|r| r.iter().map(|c| c.to_string().trim().to_owned()).collect())
            .unwrap_or_default();
        let rows = rows.map(|r| r.iter().map(CellValue::from).collect()).collect();
        Ok(Self { headers, rows })
    }

    /// Index of a header, matched case-insensitively after trimming.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name))
    }

    fn cell(&self, row: &[CellValue], column: Option<usize>) -> Option<CellValue> {
        column.and_then(|c| row.get(c)).cloned()
    }
}

// ---------------------------------------------------------------------------
// Water bodies
// ---------------------------------------------------------------------------

/// One row of the water body sizes dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterBodyRecord {
    pub name: String,
    pub area_sq_m: Option<f64>,
    pub purpose: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Extract water body records.  Rows without a name are skipped.
pub fn water_bodies(table: &DatasetTable) -> Result<Vec<WaterBodyRecord>, ServiceError> {
    let name_col = table
        .column(NAME_COLUMN)
        .ok_or_else(|| ServiceError::Dataset(format!("missing column '{NAME_COLUMN}'")))?;
    let area_col = table
        .column(AREA_COLUMN)
        .ok_or_else(|| ServiceError::Dataset(format!("missing column '{AREA_COLUMN}'")))?;
    let purpose_col = table.column(PURPOSE_COLUMN);
    let lat_col = table.column(LATITUDE_COLUMN);
    let lon_col = table.column(LONGITUDE_COLUMN);

    Ok(table
        .rows
        .iter()
        .filter_map(|row| {
            let name = table.cell(row, Some(name_col))?.as_text()?;
            Some(WaterBodyRecord {
                name: name.trim().to_owned(),
                area_sq_m: table.cell(row, Some(area_col)).and_then(|c| c.as_f64()),
                purpose: table.cell(row, purpose_col).and_then(|c| c.as_text()),
                latitude: table.cell(row, lat_col).and_then(|c| c.as_f64()),
                longitude: table.cell(row, lon_col).and_then(|c| c.as_f64()),
            })
        })
        .collect())
}

/// Distinct names in first-seen order.
pub fn unique_names(records: &[WaterBodyRecord]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for r in records {
        if !names.contains(&r.name) {
            names.push(r.name.clone());
        }
    }
    names
}

/// Smallest and largest known area, used as the slider bounds.
pub fn area_range(records: &[WaterBodyRecord]) -> Option<(f64, f64)> {
    records.iter().filter_map(|r| r.area_sq_m).fold(None, |acc, a| match acc {
        None => Some((a, a)),
        Some((lo, hi)) => Some((lo.min(a), hi.max(a))),
    })
}

/// Viewer filter over the water body table.
///
/// Nothing matches until at least one name is selected.  The area range is
/// inclusive on both ends; records with no area never match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaterBodyFilter {
    pub names: Vec<String>,
    pub min_area: Option<f64>,
    pub max_area: Option<f64>,
}

impl WaterBodyFilter {
    pub fn matches(&self, record: &WaterBodyRecord) -> bool {
        let Some(area) = record.area_sq_m else {
            return false;
        };
        self.names.iter().any(|n| n == &record.name)
            && self.min_area.map_or(true, |min| area >= min)
            && self.max_area.map_or(true, |max| area <= max)
    }

    pub fn apply(&self, records: &[WaterBodyRecord]) -> Vec<WaterBodyRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

// ---------------------------------------------------------------------------
// Portal operations
// ---------------------------------------------------------------------------

/// File name a dataset is stored under.
pub fn dataset_file_name(name: &str) -> Result<String, ServiceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::Validation("a dataset name is required".into()));
    }
    let file_name = if name.to_ascii_lowercase().ends_with(".xlsx") {
        name.to_owned()
    } else {
        format!("{name}.xlsx")
    };
    storage::folder::validate_name(&file_name)?;
    Ok(file_name)
}

impl Portal {
    pub async fn list_datasets(&self) -> Result<Vec<StoredFile>, ServiceError> {
        self.listed_files(FolderKind::Datasets).await
    }

    /// Save `bytes` as `<name>.xlsx`, replacing a dataset of the same name.
    pub async fn replace_dataset(&self, name: &str, bytes: &[u8]) -> Result<String, ServiceError> {
        let file_name = dataset_file_name(name)?;
        if bytes.is_empty() {
            return Err(ServiceError::Validation("the uploaded workbook is empty".into()));
        }
        self.store().save(FolderKind::Datasets, &file_name, bytes).await?;
        info!(file_name, "dataset replaced");
        Ok(file_name)
    }

    pub async fn delete_dataset(&self, file_name: &str) -> Result<(), ServiceError> {
        self.store().delete(FolderKind::Datasets, file_name).await?;
        info!(file_name, "dataset deleted");
        Ok(())
    }

    /// Parsed contents of a stored dataset.
    pub async fn dataset_table(&self, file_name: &str) -> Result<DatasetTable, ServiceError> {
        let bytes = self.store().read(FolderKind::Datasets, file_name).await?;
        tokio::task::spawn_blocking(move || DatasetTable::from_xlsx(&bytes)).await?
    }

    /// Water body records of a stored dataset.
    pub async fn water_body_records(
        &self,
        file_name: &str,
    ) -> Result<Vec<WaterBodyRecord>, ServiceError> {
        water_bodies(&self.dataset_table(file_name).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.into())
    }

    fn table() -> DatasetTable {
        DatasetTable {
            headers: vec![
                "Water Body Name".into(),
                "area (square meters)".into(),
                "use/ purpose".into(),
                "latitude".into(),
                "longitude".into(),
            ],
            rows: vec![
                vec![text("Umguza Dam"), CellValue::Number(5_000.0), text("supply"), CellValue::Number(-20.0), CellValue::Number(28.6)],
                vec![text("Khami Dam"), text("1200"), text("irrigation"), CellValue::Empty, CellValue::Empty],
                vec![CellValue::Empty, CellValue::Number(10.0)],
                vec![text("Hillside Dam"), CellValue::Empty, text("recreation")],
                vec![text("Umguza Dam"), CellValue::Number(4_500.0)],
            ],
        }
    }

    #[test]
    fn records_skip_unnamed_rows() {
        let records = water_bodies(&table()).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[1].area_sq_m, Some(1200.0));
        assert_eq!(records[2].area_sq_m, None);
        assert_eq!(records[3].purpose, None);
        assert_eq!(unique_names(&records), vec!["Umguza Dam", "Khami Dam", "Hillside Dam"]);
        assert_eq!(area_range(&records), Some((1200.0, 5000.0)));
    }

    #[test]
    fn missing_name_column_is_an_error() {
        let table = DatasetTable { headers: vec!["area (square meters)".into()], rows: vec![] };
        assert!(matches!(water_bodies(&table), Err(ServiceError::Dataset(_))));
    }

    #[test]
    fn filter_needs_a_selected_name() {
        let records = water_bodies(&table()).unwrap();
        assert!(WaterBodyFilter::default().apply(&records).is_empty());
    }

    #[test]
    fn filter_area_range_is_inclusive() {
        let records = water_bodies(&table()).unwrap();
        let filter = WaterBodyFilter {
            names: vec!["Umguza Dam".into(), "Khami Dam".into(), "Hillside Dam".into()],
            min_area: Some(1200.0),
            max_area: Some(4500.0),
        };
        let hits = filter.apply(&records);
        let areas: Vec<f64> = hits.iter().filter_map(|r| r.area_sq_m).collect();
        assert_eq!(areas, vec![1200.0, 4500.0]);
    }

    #[test]
    fn dataset_names_get_the_xlsx_extension() {
        assert_eq!(dataset_file_name("2024 sizes").unwrap(), "2024 sizes.xlsx");
        assert_eq!(dataset_file_name("sizes.XLSX").unwrap(), "sizes.XLSX");
        assert!(dataset_file_name("  ").is_err());
        assert!(dataset_file_name("../up").is_err());
    }

    #[test]
    fn garbage_workbook_is_a_dataset_error() {
        assert!(matches!(DatasetTable::from_xlsx(b"nope"), Err(ServiceError::Dataset(_))));
    }

    #[test]
    fn workbook_headers_match_case_insensitively() {
        let table =
            DatasetTable::from_xlsx(include_bytes!("../fixtures/water_body_sizes.xlsx")).unwrap();
        assert_eq!(table.column(NAME_COLUMN), Some(0));
        assert_eq!(table.column(PURPOSE_COLUMN), Some(2));
        assert_eq!(table.column(LONGITUDE_COLUMN), Some(4));

        let records = water_bodies(&table).unwrap();
        let names = unique_names(&records);
        assert_eq!(names, vec!["Umguza Dam", "Khami Dam", "Ncema Dam, Upper", "Hillside Dam"]);
        assert_eq!(records[0].area_sq_m, Some(5000.0));
        assert_eq!(records[0].latitude, Some(-20.05));
        assert_eq!(records[1].purpose.as_deref(), Some("Irrigation"));
        assert_eq!(records[3].area_sq_m, None);
        assert_eq!(area_range(&records), Some((1200.0, 5000.0)));
    }
}

//! `service` crate — the workflows behind both dashboards.
//!
//! [`Portal`] ties the file store, the listing cache, and the contribution
//! log together.  Handlers in the `api` crate call into it and nothing else.

pub mod error;
pub mod portal;
pub mod uploads;
pub mod analysis;
pub mod datasets;
pub mod contributions;
pub mod metrics;
pub mod charts;

pub use error::ServiceError;
pub use portal::Portal;
pub use uploads::{UploadReceipt, ADMIN_CONTRIBUTOR, ADMIN_EMAIL};
pub use datasets::{CellValue, DatasetTable, WaterBodyFilter, WaterBodyRecord};
pub use contributions::{ContributionFile, ContributionForm};
pub use metrics::{Kpis, SizeSeriesPoint};

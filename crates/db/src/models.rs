//! Row structs that map 1-to-1 onto database tables.
//!
//! These are *persistence* models — they carry no domain behaviour.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// contributions
// ---------------------------------------------------------------------------

/// A persisted contribution log row.
///
/// Text columns read as empty strings when NULL.  Rows logged by the older
/// dashboards carry local timestamps without an offset, so ordering across
/// the two formats is only approximate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ContributionRow {
    pub id: i64,
    pub map_name: String,
    pub contributor: String,
    pub email: String,
    /// RFC 3339 UTC timestamp, microsecond precision.
    pub timestamp: String,
    pub file_path: String,
}

/// Values for a new contribution row.  The id is assigned by SQLite.
#[derive(Debug, Clone)]
pub struct NewContribution {
    pub map_name: String,
    pub contributor: String,
    pub email: String,
    pub timestamp: String,
    pub file_path: String,
}

impl NewContribution {
    /// Build a row stamped with the current time.
    pub fn now(
        map_name: impl Into<String>,
        contributor: impl Into<String>,
        email: impl Into<String>,
        file_path: impl Into<String>,
    ) -> Self {
        Self {
            map_name: map_name.into(),
            contributor: contributor.into(),
            email: email.into(),
            timestamp: current_timestamp(),
            file_path: file_path.into(),
        }
    }
}

/// Timestamp format used for every row; sorts lexicographically in time order.
pub fn current_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

// ---------------------------------------------------------------------------
// aggregates
// ---------------------------------------------------------------------------

/// Joins the map names of one [`SizePoint`] (ASCII unit separator).
pub const NAME_SEPARATOR: char = '\u{1f}';

/// One point of the "size over time" series.
///
/// `total_size` is the summed length of the stored file paths for every row
/// sharing this timestamp, not the size of the files themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SizePoint {
    pub timestamp: String,
    pub total_size: i64,
    /// Map names logged at this timestamp, joined with [`NAME_SEPARATOR`].
    pub file_names: String,
}

impl SizePoint {
    pub fn names(&self) -> Vec<String> {
        self.file_names
            .split(NAME_SEPARATOR)
            .filter(|n| !n.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

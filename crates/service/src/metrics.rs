//! Contribution KPIs.

use serde::{Deserialize, Serialize};

use db::{repository::contributions as contribution_repo, SizePoint};

use crate::{Portal, ServiceError};

/// Headline numbers shown on both dashboards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kpis {
    /// Always the row count of the contributions table.
    pub total_contributions: i64,
    pub last_upload: Option<String>,
}

/// One point of the size chart.
///
/// `total_size` is the summed stored-path length at this timestamp;
/// `cumulative_size` adds up every point so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeSeriesPoint {
    pub timestamp: String,
    pub total_size: i64,
    pub cumulative_size: i64,
    pub file_names: Vec<String>,
}

/// Attach running totals to the grouped rows.
pub fn accumulate(points: Vec<SizePoint>) -> Vec<SizeSeriesPoint> {
    let mut running = 0;
    points
        .into_iter()
        .map(|p| {
            running += p.total_size;
            SizeSeriesPoint {
                file_names: p.names(),
                timestamp: p.timestamp,
                total_size: p.total_size,
                cumulative_size: running,
            }
        })
        .collect()
}

impl Portal {
    pub async fn kpis(&self) -> Result<Kpis, ServiceError> {
        let total_contributions = contribution_repo::count_contributions(self.pool()).await?;
        let last_upload = contribution_repo::latest_timestamp(self.pool()).await?;
        Ok(Kpis { total_contributions, last_upload })
    }

    pub async fn size_over_time(&self) -> Result<Vec<SizeSeriesPoint>, ServiceError> {
        Ok(accumulate(contribution_repo::size_over_time(self.pool()).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulate_keeps_running_total() {
        let series = accumulate(vec![
            SizePoint { timestamp: "t1".into(), total_size: 10, file_names: "a\u{1f}b, c".into() },
            SizePoint { timestamp: "t2".into(), total_size: 5, file_names: "c".into() },
            SizePoint { timestamp: "t3".into(), total_size: 0, file_names: String::new() },
        ]);

        let running: Vec<i64> = series.iter().map(|p| p.cumulative_size).collect();
        assert_eq!(running, vec![10, 15, 15]);
        assert_eq!(series[0].file_names, vec!["a", "b, c"]);
        assert!(series[2].file_names.is_empty());
    }
}

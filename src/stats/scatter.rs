// Cycle time scatter series: completion date vs. cycle time

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::CycleRecord;
use crate::utils::date::to_date;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScatterPoint {
    pub completed_date: NaiveDate,
    pub cycle_time_days: i64,
    pub key: String,
    pub summary: Option<String>,
}

/// One point per record with both a completion instant and a cycle time,
/// ordered by completion date
pub fn scatter_points(records: &[CycleRecord]) -> Vec<ScatterPoint> {
    let mut points: Vec<ScatterPoint> = records
        .iter()
        .filter_map(|r| {
            let completed = r.completed_timestamp?;
            let days = r.cycle_time_days()?;
            Some(ScatterPoint {
                completed_date: to_date(completed),
                cycle_time_days: days,
                key: r.key.clone(),
                summary: r.summary.clone(),
            })
        })
        .collect();
    points.sort_by(|a, b| a.completed_date.cmp(&b.completed_date).then_with(|| a.key.cmp(&b.key)));
    points
}

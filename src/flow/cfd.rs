// Cumulative flow table
//
// One row per calendar day between the first and last step timestamp seen in
// any record. Each cell counts the items that had reached that step on or
// before that day, so every column is non-decreasing.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{Analysis, CycleDefinition, CycleRecord};
use crate::utils::date::{date_range, to_date};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CfdRow {
    pub date: NaiveDate,
    /// Cumulative counts, one per column
    pub counts: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CfdTable {
    /// Step names in cycle order
    pub columns: Vec<String>,
    /// Dense, ascending by date
    pub rows: Vec<CfdRow>,
}

impl CfdTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Values of one column along the date index
    pub fn column(&self, name: &str) -> Option<Vec<u64>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r.counts[idx]).collect())
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }

    /// Largest value in a column (its final value, as columns never decrease)
    pub fn column_max(&self, name: &str) -> Option<u64> {
        self.column(name).and_then(|values| values.into_iter().max())
    }
}

/// Aggregate records into the cumulative flow table.
/// Returns `NoData` when no record has any step timestamp.
pub fn calculate_cfd(records: &[CycleRecord], cycle: &CycleDefinition) -> Analysis<CfdTable> {
    let columns: Vec<String> = cycle.steps().iter().map(|s| s.name.clone()).collect();

    // Arrivals per column per day
    let mut arrivals: Vec<BTreeMap<NaiveDate, u64>> = vec![BTreeMap::new(); columns.len()];
    let mut bounds: Option<(NaiveDate, NaiveDate)> = None;

    for record in records {
        for (idx, name) in columns.iter().enumerate() {
            if let Some(ts) = record.step(name) {
                let date = to_date(ts);
                *arrivals[idx].entry(date).or_insert(0) += 1;
                bounds = Some(match bounds {
                    None => (date, date),
                    Some((start, end)) => (start.min(date), end.max(date)),
                });
            }
        }
    }

    let Some((start, end)) = bounds else {
        log::debug!("No step timestamps in {} records; CFD has no data", records.len());
        return Analysis::NoData;
    };

    let mut totals = vec![0u64; columns.len()];
    let rows = date_range(start, end)
        .into_iter()
        .map(|date| {
            for (idx, per_day) in arrivals.iter().enumerate() {
                totals[idx] += per_day.get(&date).copied().unwrap_or(0);
            }
            CfdRow { date, counts: totals.clone() }
        })
        .collect();

    Analysis::Ready(CfdTable { columns, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::build_record;
    use crate::models::{ChangeKind, StatusEvent, StepType, WorkflowStep};
    use chrono::{DateTime, TimeZone, Utc};

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, h, 0, 0).unwrap()
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn cycle() -> CycleDefinition {
        CycleDefinition::new(vec![
            WorkflowStep::new("todo", StepType::Backlog, &["todo"]),
            WorkflowStep::new("doing", StepType::Accepted, &["doing"]),
            WorkflowStep::new("done", StepType::Complete, &["done"]),
        ])
        .unwrap()
    }

    fn record(key: &str, todo: Option<DateTime<Utc>>, doing: Option<DateTime<Utc>>, done: Option<DateTime<Utc>>) -> CycleRecord {
        let mut r = CycleRecord::new(key, &["todo", "doing", "done"]);
        r.steps[0].timestamp = todo;
        r.steps[1].timestamp = doing;
        r.steps[2].timestamp = done;
        r
    }

    #[test]
    fn test_empty_input_has_no_data() {
        assert!(calculate_cfd(&[], &cycle()).is_no_data());
        let untouched = record("A-1", None, None, None);
        assert!(calculate_cfd(&[untouched], &cycle()).is_no_data());
    }

    #[test]
    fn test_dense_cumulative_counts() {
        let records = vec![
            record("A-1", Some(at(1, 9)), Some(at(2, 9)), Some(at(5, 17))),
            record("A-2", Some(at(1, 23)), Some(at(4, 1)), None),
            record("A-3", Some(at(3, 0)), None, None),
        ];
        let table = calculate_cfd(&records, &cycle()).into_option().unwrap();

        assert_eq!(table.columns, vec!["todo", "doing", "done"]);
        assert_eq!(table.dates(), vec![date(1), date(2), date(3), date(4), date(5)]);
        assert_eq!(table.column("todo").unwrap(), vec![2, 2, 3, 3, 3]);
        assert_eq!(table.column("doing").unwrap(), vec![0, 1, 1, 2, 2]);
        assert_eq!(table.column("done").unwrap(), vec![0, 0, 0, 0, 1]);
        assert_eq!(table.column_max("todo"), Some(3));
        assert_eq!(table.last_date(), Some(date(5)));
        assert_eq!(table.column("missing"), None);
    }

    #[test]
    fn test_columns_never_decrease_and_done_matches_completions() {
        let mut records = Vec::new();
        for i in 0..20u32 {
            let start = at(1 + i % 7, i % 24);
            let done = if i % 3 == 0 { Some(at(10 + i % 5, 12)) } else { None };
            let mut r = record(&format!("A-{}", i), Some(start), Some(at(8, 0)), done);
            if done.is_some() {
                r.completed_timestamp = done;
            }
            records.push(r);
        }
        let table = calculate_cfd(&records, &cycle()).into_option().unwrap();

        for name in &table.columns {
            let values = table.column(name).unwrap();
            assert!(values.windows(2).all(|w| w[0] <= w[1]), "{} decreased", name);
        }
        let completed = records.iter().filter(|r| r.is_completed()).count() as u64;
        assert_eq!(*table.column("done").unwrap().last().unwrap(), completed);
    }

    #[test]
    fn test_done_without_accepted_step_counts_in_cfd_only() {
        // todo -> done skips every accepted step: no cycle time, but the
        // done column still counts the item
        let event = |status: &str, d: u32| StatusEvent {
            issue_key: "A-1".to_string(),
            change: ChangeKind::Status,
            timestamp: at(d, 9),
            status: status.to_string(),
            resolution: None,
            is_resolved: false,
        };
        let outcome = build_record("A-1", &[event("todo", 1), event("done", 3)], &cycle());
        assert!(outcome.record.completed_timestamp.is_none());

        let records = vec![outcome.record];
        let table = calculate_cfd(&records, &cycle()).into_option().unwrap();
        assert_eq!(table.column_max("done"), Some(1));
        assert_eq!(records.iter().filter(|r| r.is_completed()).count(), 0);
    }
}

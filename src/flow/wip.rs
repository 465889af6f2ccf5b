// Work-in-progress views: ageing of open items, weekly WIP and weekly net flow

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::ConfigError;
use crate::flow::cfd::CfdTable;
use crate::models::{Analysis, CycleDefinition, CycleRecord};
use crate::stats::percentile::quantile_sorted;
use crate::utils::date::{to_date, week_start};

/// An item still in progress and how long since it started
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgeingItem {
    pub key: String,
    pub summary: Option<String>,
    /// Last step (within the start..=end range) the item reached
    pub status: String,
    pub age_days: i64,
}

/// Weekly arrivals versus departures
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetFlowWeek {
    pub week_start: NaiveDate,
    pub arrivals: Option<i64>,
    pub departures: Option<i64>,
    pub net_flow: Option<i64>,
}

/// Spread of daily WIP within one week
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WipWeek {
    pub week_start: NaiveDate,
    pub min: i64,
    pub max: i64,
    pub mean: f64,
    pub median: f64,
}

fn step_index(cycle: &CycleDefinition, name: &str) -> Result<usize, ConfigError> {
    cycle
        .index_of(name)
        .ok_or_else(|| ConfigError::UnknownStep(name.to_string()))
}

/// Age of every item that has not reached `done_column` (default: last step).
///
/// Status is the last step between `start_column` and `end_column` with a
/// timestamp; age counts whole days from the start column's date to `today`.
/// Items that never reached the start column are left out.
pub fn ageing_wip(
    records: &[CycleRecord],
    cycle: &CycleDefinition,
    start_column: &str,
    end_column: &str,
    done_column: Option<&str>,
    today: NaiveDate,
) -> Result<Analysis<Vec<AgeingItem>>, ConfigError> {
    let start = step_index(cycle, start_column)?;
    let end = step_index(cycle, end_column)?;
    let done = match done_column {
        Some(name) => step_index(cycle, name)?,
        None => cycle.len() - 1,
    };
    let steps = cycle.steps();

    let items: Vec<AgeingItem> = records
        .iter()
        .filter(|r| r.step_at(done).is_none())
        .filter_map(|r| {
            let started = r.step_at(start)?;
            let status = (start..=end)
                .rev()
                .find(|&i| r.step_at(i).is_some())
                .map(|i| steps[i].name.clone())?;
            Some(AgeingItem {
                key: r.key.clone(),
                summary: r.summary.clone(),
                status,
                age_days: (today - to_date(started)).num_days(),
            })
        })
        .collect();

    if items.is_empty() {
        return Ok(Analysis::NoData);
    }
    Ok(Analysis::Ready(items))
}

/// CFD column by name, or `default` when no name is given
fn cfd_column(cfd: &CfdTable, name: Option<&str>, default: usize) -> Result<usize, ConfigError> {
    match name {
        Some(n) => cfd
            .column_index(n)
            .ok_or_else(|| ConfigError::UnknownStep(n.to_string())),
        None => Ok(default),
    }
}

/// Daily WIP (`start - end` cumulative counts) summarised per week.
///
/// Same column defaults as [`net_flow`]. WIP can dip below zero when items
/// reach the end column without passing through the start column.
pub fn weekly_wip(
    cfd: &CfdTable,
    start_column: Option<&str>,
    end_column: Option<&str>,
) -> Result<Analysis<Vec<WipWeek>>, ConfigError> {
    if cfd.rows.is_empty() || cfd.columns.len() < 2 {
        return Ok(Analysis::NoData);
    }
    let start = cfd_column(cfd, start_column, 1)?;
    let end = cfd_column(cfd, end_column, cfd.columns.len() - 1)?;

    let mut weekly: BTreeMap<NaiveDate, Vec<i64>> = BTreeMap::new();
    for row in &cfd.rows {
        weekly
            .entry(week_start(row.date))
            .or_default()
            .push(row.counts[start] as i64 - row.counts[end] as i64);
    }

    let weeks = weekly
        .into_iter()
        .map(|(week_start, mut wip)| {
            wip.sort_unstable();
            let values: Vec<f64> = wip.iter().map(|&w| w as f64).collect();
            WipWeek {
                week_start,
                min: wip[0],
                max: wip[wip.len() - 1],
                mean: values.iter().sum::<f64>() / values.len() as f64,
                median: quantile_sorted(&values, 0.5),
            }
        })
        .collect();

    Ok(Analysis::Ready(weeks))
}

/// Weekly net flow from the cumulative flow table.
///
/// Uses the second column as arrivals and the last as departures unless
/// overridden. Each week takes the highest cumulative value seen in it; the
/// first week has no previous week to diff against.
pub fn net_flow(
    cfd: &CfdTable,
    start_column: Option<&str>,
    end_column: Option<&str>,
) -> Result<Analysis<Vec<NetFlowWeek>>, ConfigError> {
    if cfd.rows.is_empty() || cfd.columns.len() < 2 {
        return Ok(Analysis::NoData);
    }
    let start = cfd_column(cfd, start_column, 1)?;
    let end = cfd_column(cfd, end_column, cfd.columns.len() - 1)?;

    let mut weekly: BTreeMap<NaiveDate, (u64, u64)> = BTreeMap::new();
    for row in &cfd.rows {
        let entry = weekly.entry(week_start(row.date)).or_insert((0, 0));
        entry.0 = entry.0.max(row.counts[start]);
        entry.1 = entry.1.max(row.counts[end]);
    }

    let mut weeks = Vec::with_capacity(weekly.len());
    let mut previous: Option<(u64, u64)> = None;
    for (week_start, (arrived, departed)) in weekly {
        let (arrivals, departures) = match previous {
            Some((pa, pd)) => (Some(arrived as i64 - pa as i64), Some(departed as i64 - pd as i64)),
            None => (None, None),
        };
        weeks.push(NetFlowWeek {
            week_start,
            arrivals,
            departures,
            net_flow: departures.zip(arrivals).map(|(d, a)| d - a),
        });
        previous = Some((arrived, departed));
    }

    Ok(Analysis::Ready(weeks))
}

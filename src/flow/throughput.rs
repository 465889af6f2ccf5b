// Throughput: completed items per fixed period

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Analysis, CycleRecord};
use crate::utils::date::{to_date, week_start};

/// Sampling period for throughput and forecasts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Day,
    /// Weeks start on Monday
    Week,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Day => "day",
            Frequency::Week => "week",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "day" | "daily" | "d" => Some(Frequency::Day),
            "week" | "weekly" | "w" => Some(Frequency::Week),
            _ => None,
        }
    }

    /// First day of the period containing `date`
    pub fn period_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Frequency::Day => date,
            Frequency::Week => week_start(date),
        }
    }

    pub fn length(&self) -> Duration {
        match self {
            Frequency::Day => Duration::days(1),
            Frequency::Week => Duration::weeks(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThroughputPeriod {
    pub start: NaiveDate,
    pub count: u64,
}

/// Completed items per period, dense from the first to the last period
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThroughputSeries {
    pub frequency: Frequency,
    pub periods: Vec<ThroughputPeriod>,
}

impl ThroughputSeries {
    /// Series from raw counts, one per period starting at `start`
    pub fn from_counts(frequency: Frequency, start: NaiveDate, counts: &[u64]) -> Self {
        let start = frequency.period_start(start);
        let periods = counts
            .iter()
            .enumerate()
            .map(|(i, &count)| ThroughputPeriod {
                start: start + frequency.length() * i as i32,
                count,
            })
            .collect();
        Self { frequency, periods }
    }

    pub fn counts(&self) -> Vec<u64> {
        self.periods.iter().map(|p| p.count).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

/// Count completions per period. Periods without completions between the
/// first and last one are present with a zero count.
pub fn calculate_throughput(records: &[CycleRecord], frequency: Frequency) -> Analysis<ThroughputSeries> {
    let mut per_period: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for ts in records.iter().filter_map(|r| r.completed_timestamp) {
        *per_period.entry(frequency.period_start(to_date(ts))).or_insert(0) += 1;
    }

    let (Some(&first), Some(&last)) = (per_period.keys().next(), per_period.keys().next_back()) else {
        return Analysis::NoData;
    };

    let mut counts = Vec::new();
    let mut start = first;
    while start <= last {
        counts.push(per_period.get(&start).copied().unwrap_or(0));
        start += frequency.length();
    }

    Analysis::Ready(ThroughputSeries::from_counts(frequency, first, &counts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn completed(key: &str, d: u32) -> CycleRecord {
        let mut r = CycleRecord::new(key, &["todo", "done"]);
        r.completed_timestamp = Some(Utc.with_ymd_and_hms(2024, 4, d, 15, 0, 0).unwrap());
        r
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
    }

    #[test]
    fn test_frequency_parsing() {
        assert_eq!(Frequency::from_str("Week"), Some(Frequency::Week));
        assert_eq!(Frequency::from_str("daily"), Some(Frequency::Day));
        assert_eq!(Frequency::from_str("month"), None);
        assert_eq!(Frequency::default(), Frequency::Day);
    }

    #[test]
    fn test_daily_throughput_is_dense() {
        let records = vec![
            completed("A-1", 2),
            completed("A-2", 2),
            completed("A-3", 5),
            CycleRecord::new("A-4", &["todo", "done"]),
        ];
        let series = calculate_throughput(&records, Frequency::Day).into_option().unwrap();
        assert_eq!(series.periods.first().unwrap().start, date(2));
        assert_eq!(series.counts(), vec![2, 0, 0, 1]);
        assert_eq!(series.counts().iter().sum::<u64>(), 3);
    }

    #[test]
    fn test_weekly_throughput_labels_mondays() {
        // 2024-04-01 is a Monday
        let records = vec![completed("A-1", 3), completed("A-2", 7), completed("A-3", 16)];
        let series = calculate_throughput(&records, Frequency::Week).into_option().unwrap();
        let starts: Vec<NaiveDate> = series.periods.iter().map(|p| p.start).collect();
        assert_eq!(starts, vec![date(1), date(8), date(15)]);
        assert_eq!(series.counts(), vec![2, 0, 1]);
    }

    #[test]
    fn test_no_completions_has_no_data() {
        let records = vec![CycleRecord::new("A-1", &["todo", "done"])];
        assert!(calculate_throughput(&records, Frequency::Day).is_no_data());
    }

    #[test]
    fn test_from_counts() {
        let series = ThroughputSeries::from_counts(Frequency::Week, date(3), &[1, 2]);
        assert_eq!(series.periods[0].start, date(1));
        assert_eq!(series.periods[1].start, date(8));
        assert_eq!(series.counts().iter().sum::<u64>(), 3);
    }
}

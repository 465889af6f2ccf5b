// Cycle time histogram in whole days

use chrono::Duration;
use serde::Serialize;

use crate::models::{Analysis, CycleRecord};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// Bucket boundaries in days; one more than `counts`
    pub edges: Vec<f64>,
    pub counts: Vec<u64>,
}

impl Histogram {
    /// Labels like "0.0 to 1.5", one per bucket
    pub fn labels(&self) -> Vec<String> {
        self.edges
            .windows(2)
            .map(|w| format!("{:.1} to {:.1}", w[0], w[1]))
            .collect()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Histogram of durations, truncated to whole days, in `bins` equal-width
/// buckets spanning [min, max]. The last bucket includes its right edge.
/// When every value is equal the range is widened by half a day each side.
/// `bins == 0` is treated as a single bucket.
pub fn histogram_days(data: &[Option<Duration>], bins: usize) -> Analysis<Histogram> {
    let days: Vec<f64> = data.iter().flatten().map(|d| d.num_days() as f64).collect();
    if days.is_empty() {
        return Analysis::NoData;
    }
    let bins = bins.max(1);

    let mut min = days.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = days.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        min -= 0.5;
        max += 0.5;
    }
    let width = (max - min) / bins as f64;

    let edges: Vec<f64> = (0..=bins)
        .map(|i| if i == bins { max } else { min + width * i as f64 })
        .collect();

    let mut counts = vec![0u64; bins];
    for value in days {
        let mut idx = (((value - min) / width).floor() as usize).min(bins - 1);
        // Division can land a value sitting on an edge one bucket off
        while idx + 1 < bins && value >= edges[idx + 1] {
            idx += 1;
        }
        while idx > 0 && value < edges[idx] {
            idx -= 1;
        }
        counts[idx] += 1;
    }

    Analysis::Ready(Histogram { edges, counts })
}

/// Histogram of the records' cycle times
pub fn cycle_time_histogram(records: &[CycleRecord], bins: usize) -> Analysis<Histogram> {
    let data: Vec<Option<Duration>> = records.iter().map(|r| r.cycle_time).collect();
    histogram_days(&data, bins)
}

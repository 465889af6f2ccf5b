// Percentiles with linear interpolation between order statistics

use chrono::Duration;
use serde::Serialize;

use crate::models::{Analysis, CycleRecord};

/// Quantiles reported when none are configured
pub const DEFAULT_QUANTILES: [f64; 5] = [0.3, 0.5, 0.7, 0.85, 0.95];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Percentile<T> {
    pub quantile: f64,
    pub value: T,
}

/// Interpolated quantile of an ascending, non-empty slice.
///
/// Position `q * (n - 1)`, interpolated between the floor and ceiling order
/// statistics. `q` is clamped to [0, 1].
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let fraction = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * fraction
}

/// Percentiles of `data`, ignoring null (and NaN) entries.
/// Returns `NoData` when nothing is left.
pub fn percentiles(data: &[Option<f64>], quantiles: &[f64]) -> Analysis<Vec<Percentile<f64>>> {
    let mut values: Vec<f64> = data.iter().flatten().copied().filter(|v| !v.is_nan()).collect();
    if values.is_empty() {
        return Analysis::NoData;
    }
    values.sort_by(|a, b| a.total_cmp(b));

    Analysis::Ready(
        quantiles
            .iter()
            .map(|&q| Percentile { quantile: q, value: quantile_sorted(&values, q) })
            .collect(),
    )
}

/// Cycle time percentiles over the records that have a cycle time
pub fn cycle_time_percentiles(records: &[CycleRecord], quantiles: &[f64]) -> Analysis<Vec<Percentile<Duration>>> {
    let millis: Vec<Option<f64>> = records
        .iter()
        .map(|r| r.cycle_time.map(|d| d.num_milliseconds() as f64))
        .collect();

    percentiles(&millis, quantiles).map(|ps| {
        ps.into_iter()
            .map(|p| Percentile {
                quantile: p.quantile,
                value: Duration::milliseconds(p.value.round() as i64),
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_value() {
        let result = percentiles(&[Some(4.0)], &[0.5]).into_option().unwrap();
        assert_eq!(result, vec![Percentile { quantile: 0.5, value: 4.0 }]);
    }

    #[test]
    fn test_empty_and_all_null_have_no_data() {
        assert!(percentiles(&[], &[0.5]).is_no_data());
        assert!(percentiles(&[None, None], &[0.5]).is_no_data());
    }

    #[test]
    fn test_linear_interpolation() {
        let data: Vec<Option<f64>> = vec![Some(10.0), None, Some(1.0), Some(4.0), Some(2.0)];
        let result = percentiles(&data, &[0.0, 0.5, 0.75, 1.0]).into_option().unwrap();
        let values: Vec<f64> = result.iter().map(|p| p.value).collect();
        // sorted: 1, 2, 4, 10
        assert_eq!(values[0], 1.0);
        assert_eq!(values[1], 3.0);
        assert_eq!(values[2], 5.5);
        assert_eq!(values[3], 10.0);
    }

    #[test]
    fn test_cycle_time_percentiles() {
        let mut records = Vec::new();
        for (i, days) in [Some(1), Some(3), None, Some(2)].iter().enumerate() {
            let mut r = CycleRecord::new(&format!("A-{}", i), &["todo", "done"]);
            r.cycle_time = days.map(Duration::days);
            records.push(r);
        }
        let result = cycle_time_percentiles(&records, &[0.5, 0.25]).into_option().unwrap();
        assert_eq!(result[0].value, Duration::days(2));
        assert_eq!(result[1].value, Duration::hours(36));
        assert!(cycle_time_percentiles(&[], &[0.5]).is_no_data());
    }
}

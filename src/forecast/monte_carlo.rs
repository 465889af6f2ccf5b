// Monte Carlo completion forecast
//
// Each trial bootstraps the historical throughput: every period adds one
// per-period count drawn with replacement, until the running total reaches
// the target. Trials are independent and run in parallel, each with its own
// seeded RNG, so a fixed seed reproduces the same paths on any thread count.

use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;

use crate::flow::throughput::ThroughputSeries;
use crate::models::Analysis;
use crate::stats::percentile::{percentiles, Percentile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrialPoint {
    pub date: NaiveDate,
    pub value: u64,
}

/// One simulated path from the start state to (at least) the target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForecastTrial {
    pub points: Vec<TrialPoint>,
}

impl ForecastTrial {
    /// Earliest point at or above `target`
    pub fn finish(&self, target: u64) -> Option<&TrialPoint> {
        self.points.iter().find(|p| p.value >= target)
    }

    /// Number of simulated periods
    pub fn periods(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// Path with values capped at `target` (for plotting)
    pub fn clipped(&self, target: u64) -> Vec<TrialPoint> {
        self.points
            .iter()
            .map(|p| TrialPoint { date: p.date, value: p.value.min(target) })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastParams {
    pub start_date: NaiveDate,
    pub start_value: u64,
    pub target_value: u64,
    pub trials: usize,
    /// Base seed; trial `i` uses `seed + i`. Random when absent.
    pub seed: Option<u64>,
}

/// Simulate `params.trials` independent paths.
///
/// Returns `NoData` when the historical throughput sums to zero, since no
/// path could ever reach the target.
pub fn run_trials(throughput: &ThroughputSeries, params: &ForecastParams) -> Analysis<Vec<ForecastTrial>> {
    let counts = throughput.counts();
    if counts.iter().sum::<u64>() == 0 {
        log::warn!("Historical throughput is zero; skipping forecast");
        return Analysis::NoData;
    }

    let base_seed = params.seed.unwrap_or_else(|| rand::rng().random());
    let step = throughput.frequency.length();

    let trials: Vec<ForecastTrial> = (0..params.trials)
        .into_par_iter()
        .map(|i| {
            let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(i as u64));
            let mut date = params.start_date;
            let mut value = params.start_value;
            let mut points = vec![TrialPoint { date, value }];

            while value < params.target_value {
                date += step;
                value += counts[rng.random_range(0..counts.len())];
                points.push(TrialPoint { date, value });
            }

            ForecastTrial { points }
        })
        .collect();

    log::debug!(
        "Ran {} trials from {} to {} (seed {})",
        trials.len(),
        params.start_value,
        params.target_value,
        base_seed
    );
    Analysis::Ready(trials)
}

/// Percentiles of the trials' finish dates, floored to a calendar day
pub fn finish_date_percentiles(
    trials: &[ForecastTrial],
    target: u64,
    quantiles: &[f64],
) -> Analysis<Vec<Percentile<NaiveDate>>> {
    let day_numbers: Vec<Option<f64>> = trials
        .iter()
        .map(|t| t.finish(target).map(|p| p.date.num_days_from_ce() as f64))
        .collect();

    percentiles(&day_numbers, quantiles).map(|ps| {
        ps.into_iter()
            .filter_map(|p| {
                NaiveDate::from_num_days_from_ce_opt(p.value.floor() as i32)
                    .map(|date| Percentile { quantile: p.quantile, value: date })
            })
            .collect()
    })
}

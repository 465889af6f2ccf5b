// Burnup forecast: Monte Carlo trials seeded from the cumulative flow table

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::ConfigError;
use crate::flow::cfd::CfdTable;
use crate::flow::throughput::ThroughputSeries;
use crate::forecast::monte_carlo::{finish_date_percentiles, run_trials, ForecastParams, ForecastTrial};
use crate::models::Analysis;
use crate::stats::percentile::Percentile;

/// Quantiles of the finish date reported by default
pub const DEFAULT_FORECAST_QUANTILES: [f64; 4] = [0.5, 0.75, 0.85, 0.95];

#[derive(Debug, Clone)]
pub struct BurnupOptions {
    pub trials: usize,
    /// Defaults to the highest value of the backlog column
    pub target: Option<u64>,
    /// Defaults to the first CFD column
    pub backlog_column: Option<String>,
    /// Defaults to the last CFD column
    pub done_column: Option<String>,
    pub quantiles: Vec<f64>,
    pub seed: Option<u64>,
}

impl Default for BurnupOptions {
    fn default() -> Self {
        Self {
            trials: 100,
            target: None,
            backlog_column: None,
            done_column: None,
            quantiles: DEFAULT_FORECAST_QUANTILES.to_vec(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BurnupForecast {
    pub backlog_column: String,
    pub done_column: String,
    pub start_date: NaiveDate,
    pub start_value: u64,
    pub target: u64,
    pub trials: Vec<ForecastTrial>,
    pub finish_dates: Vec<Percentile<NaiveDate>>,
}

/// Forecast when the done column will catch up with the target.
///
/// Starts from the last CFD date at the done column's final value. `NoData`
/// when the CFD or the throughput is empty, or throughput sums to zero.
pub fn burnup_forecast(
    cfd: &CfdTable,
    throughput: &ThroughputSeries,
    options: &BurnupOptions,
) -> Result<Analysis<BurnupForecast>, ConfigError> {
    let resolve = |name: &Option<String>, fallback: Option<&String>| -> Result<Option<String>, ConfigError> {
        match name {
            Some(n) if cfd.column_index(n).is_none() => Err(ConfigError::UnknownStep(n.clone())),
            Some(n) => Ok(Some(n.clone())),
            None => Ok(fallback.cloned()),
        }
    };
    let backlog_column = resolve(&options.backlog_column, cfd.columns.first())?;
    let done_column = resolve(&options.done_column, cfd.columns.last())?;

    let (Some(backlog_column), Some(done_column), Some(start_date)) =
        (backlog_column, done_column, cfd.last_date())
    else {
        return Ok(Analysis::NoData);
    };
    if throughput.is_empty() {
        return Ok(Analysis::NoData);
    }

    let target = match options.target {
        Some(t) => t,
        None => cfd.column_max(&backlog_column).unwrap_or(0),
    };
    let start_value = cfd.column_max(&done_column).unwrap_or(0);

    let params = ForecastParams {
        start_date,
        start_value,
        target_value: target,
        trials: options.trials,
        seed: options.seed,
    };
    let Analysis::Ready(trials) = run_trials(throughput, &params) else {
        return Ok(Analysis::NoData);
    };

    let finish_dates = finish_date_percentiles(&trials, target, &options.quantiles)
        .into_option()
        .unwrap_or_default();

    log::info!(
        "Burnup forecast: {} -> {} over {} trials from {}",
        start_value,
        target,
        trials.len(),
        start_date
    );

    Ok(Analysis::Ready(BurnupForecast {
        backlog_column,
        done_column,
        start_date,
        start_value,
        target,
        trials,
        finish_dates,
    }))
}

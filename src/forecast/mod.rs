// Completion forecasting by bootstrap resampling of throughput

pub mod burnup;
pub mod monte_carlo;

pub use burnup::{burnup_forecast, BurnupForecast, BurnupOptions, DEFAULT_FORECAST_QUANTILES};
pub use monte_carlo::{finish_date_percentiles, run_trials, ForecastParams, ForecastTrial, TrialPoint};

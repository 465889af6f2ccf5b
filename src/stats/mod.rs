// Statistics over cycle times

pub mod histogram;
pub mod percentile;
pub mod scatter;

pub use histogram::{cycle_time_histogram, histogram_days, Histogram};
pub use percentile::{cycle_time_percentiles, percentiles, quantile_sorted, Percentile, DEFAULT_QUANTILES};
pub use scatter::{scatter_points, ScatterPoint};

//! cycletime - cycle time, flow and forecast analytics for issue trackers
//!
//! Replays each work item's status history against a configured workflow
//! and derives:
//! - one cycle record per item (last time each step was entered)
//! - cumulative flow, throughput, ageing WIP, weekly WIP and net flow
//! - cycle time percentiles, histogram and scatter points
//! - Monte Carlo burnup forecasts
//!
//! # Example
//!
//! ```no_run
//! use cycletime::cli::{report, run};
//!
//! fn main() {
//!     if let Err(e) = run() {
//!         std::process::exit(report(&e));
//!     }
//! }
//! ```

pub mod cli;
pub mod config;
pub mod cycle;
pub mod error;
pub mod flow;
pub mod forecast;
pub mod models;
pub mod source;
pub mod stats;
pub mod utils;

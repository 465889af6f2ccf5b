pub mod date;
pub mod duration;
pub mod fuzzy;

pub use date::*;
pub use duration::{as_days_f64, format_duration};

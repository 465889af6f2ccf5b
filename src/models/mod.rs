// Core data models for cycletime
// Raw tracker input, derived events and records, and analysis results

pub mod analysis;
pub mod event;
pub mod history;
pub mod record;
pub mod workflow;

pub use analysis::*;
pub use event::*;
pub use history::*;
pub use record::*;
pub use workflow::*;

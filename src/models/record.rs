use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::utils::duration::serde_seconds;

/// Timestamp captured for one workflow step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepTime {
    pub name: String,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Per-item cycle record
///
/// `steps` is always in cycle definition order and covers every step.
/// Non-null step timestamps are non-decreasing in that order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleRecord {
    pub key: String,
    pub url: Option<String>,
    pub issue_type: Option<String>,
    pub summary: Option<String>,
    pub status: String,
    pub resolution: Option<String>,
    /// Configured attributes (logical name -> resolved value)
    pub fields: BTreeMap<String, serde_json::Value>,
    pub steps: Vec<StepTime>,
    #[serde(with = "serde_seconds")]
    pub cycle_time: Option<Duration>,
    pub completed_timestamp: Option<DateTime<Utc>>,
}

impl CycleRecord {
    /// Empty record for `key` with a null slot per step name
    pub fn new(key: &str, step_names: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            url: None,
            issue_type: None,
            summary: None,
            status: String::new(),
            resolution: None,
            fields: BTreeMap::new(),
            steps: step_names
                .iter()
                .map(|name| StepTime { name: name.to_string(), timestamp: None })
                .collect(),
            cycle_time: None,
            completed_timestamp: None,
        }
    }

    /// Timestamp for a step by name
    pub fn step(&self, name: &str) -> Option<DateTime<Utc>> {
        self.steps
            .iter()
            .find(|s| s.name == name)
            .and_then(|s| s.timestamp)
    }

    /// Timestamp for a step by position in the cycle
    pub fn step_at(&self, index: usize) -> Option<DateTime<Utc>> {
        self.steps.get(index).and_then(|s| s.timestamp)
    }

    /// Cycle time truncated to whole days
    pub fn cycle_time_days(&self) -> Option<i64> {
        self.cycle_time.map(|d| d.num_days())
    }

    pub fn is_completed(&self) -> bool {
        self.completed_timestamp.is_some()
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What produced a status event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Synthetic event for the item's creation
    Created,
    Status,
    Resolution,
}

/// Snapshot of an item's status and resolution at one point in its history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub issue_key: String,
    pub change: ChangeKind,
    pub timestamp: DateTime<Utc>,
    pub status: String,
    pub resolution: Option<String>,
    pub is_resolved: bool,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One field transition inside a changelog entry.
///
/// Mirrors the tracker's changelog item: `from`/`to` hold raw ids,
/// `fromString`/`toString` hold display labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default, rename = "fromString")]
    pub from_string: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default, rename = "toString")]
    pub to_string: Option<String>,
}

impl FieldChange {
    pub fn is_status(&self) -> bool {
        self.field == "status"
    }

    pub fn is_resolution(&self) -> bool {
        self.field == "resolution"
    }

    /// True when the transition sets a non-empty new value
    pub fn sets_value(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        present(&self.to) || present(&self.to_string)
    }
}

/// A set of field transitions recorded at the same instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeBatch {
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<FieldChange>,
}

/// Raw change history of one item, as exported by the issue tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueHistory {
    pub key: String,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub issue_type: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    pub status: String,
    #[serde(default)]
    pub resolution: Option<String>,
    /// Raw field id -> value, used to resolve configured attributes
    #[serde(default)]
    pub fields: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub changelog: Vec<ChangeBatch>,
}

impl IssueHistory {
    pub fn new(key: &str, created: DateTime<Utc>, status: &str) -> Self {
        Self {
            key: key.to_string(),
            created,
            issue_type: None,
            summary: None,
            status: status.to_string(),
            resolution: None,
            fields: HashMap::new(),
            changelog: Vec::new(),
        }
    }

    /// Append a status transition batch (test and fixture helper)
    pub fn with_transition(mut self, at: DateTime<Utc>, from: &str, to: &str) -> Self {
        self.changelog.push(ChangeBatch {
            created: at,
            items: vec![FieldChange {
                field: "status".to_string(),
                from: None,
                from_string: Some(from.to_string()),
                to: None,
                to_string: Some(to.to_string()),
            }],
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_tracker_shape() {
        let json = r#"{
            "key": "ABC-1",
            "created": "2024-01-02T09:30:00+02:00",
            "status": "Done",
            "resolution": "Fixed",
            "changelog": [
                {"created": "2024-01-03T10:00:00Z",
                 "items": [{"field": "status", "fromString": "Open", "toString": "Done", "from": "1", "to": "6"}]}
            ]
        }"#;
        let issue: IssueHistory = serde_json::from_str(json).unwrap();
        assert_eq!(issue.key, "ABC-1");
        assert_eq!(issue.created.to_rfc3339(), "2024-01-02T07:30:00+00:00");
        assert_eq!(issue.changelog.len(), 1);
        let item = &issue.changelog[0].items[0];
        assert!(item.is_status());
        assert_eq!(item.from_string.as_deref(), Some("Open"));
        assert_eq!(item.to_string.as_deref(), Some("Done"));
        assert!(issue.fields.is_empty());
    }

    #[test]
    fn test_sets_value() {
        let mut change = FieldChange {
            field: "resolution".to_string(),
            from: None,
            from_string: None,
            to: Some("10000".to_string()),
            to_string: Some("Done".to_string()),
        };
        assert!(change.sets_value());
        change.to = None;
        change.to_string = Some(String::new());
        assert!(!change.sets_value());
    }
}

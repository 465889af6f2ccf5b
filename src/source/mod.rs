// Issue history source
//
// The tracker query runs elsewhere; this reads its JSON export. Accepts either
// a bare array of issues or a search response object with an `issues` array.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

use crate::models::IssueHistory;

#[derive(Deserialize)]
#[serde(untagged)]
enum Export {
    List(Vec<IssueHistory>),
    Search { issues: Vec<IssueHistory> },
}

/// Parse issue histories from any reader
pub fn read_histories<R: Read>(reader: R) -> Result<Vec<IssueHistory>> {
    let export: Export = serde_json::from_reader(reader)
        .context("Failed to parse issue export (expected a JSON array or an object with `issues`)")?;
    Ok(match export {
        Export::List(issues) => issues,
        Export::Search { issues } => issues,
    })
}

/// Load issue histories from a JSON file
pub fn load_histories(path: &Path) -> Result<Vec<IssueHistory>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open issue export: {}", path.display()))?;
    let issues = read_histories(std::io::BufReader::new(file))
        .with_context(|| format!("Failed to load issues from {}", path.display()))?;
    log::info!("Loaded {} issues from {}", issues.len(), path.display());
    Ok(issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ISSUE: &str = r#"{
        "key": "ABC-1",
        "created": "2024-01-01T09:00:00Z",
        "status": "Open",
        "fields": {"customfield_1": {"value": "Small"}}
    }"#;

    #[test]
    fn test_read_bare_array() {
        let json = format!("[{}]", ISSUE);
        let issues = read_histories(json.as_bytes()).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].key, "ABC-1");
        assert!(issues[0].changelog.is_empty());
        assert!(issues[0].fields.contains_key("customfield_1"));
    }

    #[test]
    fn test_read_search_response() {
        let json = format!(r#"{{"total": 1, "issues": [{}]}}"#, ISSUE);
        let issues = read_histories(json.as_bytes()).unwrap();
        assert_eq!(issues[0].status, "Open");
    }

    #[test]
    fn test_invalid_export() {
        assert!(read_histories("{\"nope\": 1}".as_bytes()).is_err());
        assert!(read_histories("[{\"key\": \"A-1\"}]".as_bytes()).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_histories(&temp_dir.path().join("issues.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to open issue export"));
    }
}

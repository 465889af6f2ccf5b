// Status history replay
//
// Rebuilds the ordered sequence of status snapshots for one item from its raw
// changelog. Pure: calling it twice with the same history yields the same
// events.

use crate::models::{ChangeBatch, ChangeKind, IssueHistory, StatusEvent};

/// Replay an item's changelog into status events.
///
/// The first event is synthetic and marks creation, using the status the item
/// had before its earliest recorded status transition (or its current status
/// when it never transitioned). One event follows per status transition, and,
/// with `include_resolution_changes`, one per resolution transition. Events
/// derived from the same changelog entry share its timestamp.
///
/// `is_resolved` turns true the first time a resolution transition sets a
/// non-empty value and stays true afterwards.
pub fn replay(history: &IssueHistory, include_resolution_changes: bool) -> Vec<StatusEvent> {
    let mut batches: Vec<&ChangeBatch> = history.changelog.iter().collect();
    batches.sort_by_key(|b| b.created);

    let mut last_status = batches
        .iter()
        .flat_map(|b| b.items.iter())
        .find(|item| item.is_status())
        .and_then(|item| item.from_string.clone())
        .unwrap_or_else(|| history.status.clone());
    let mut last_resolution: Option<String> = None;
    let mut is_resolved = false;

    let mut events = Vec::with_capacity(1 + history.changelog.len());
    events.push(StatusEvent {
        issue_key: history.key.clone(),
        change: ChangeKind::Created,
        timestamp: history.created,
        status: last_status.clone(),
        resolution: None,
        is_resolved,
    });

    for batch in batches {
        if batch.items.iter().any(|i| i.is_resolution() && i.sets_value()) {
            is_resolved = true;
        }

        for item in &batch.items {
            if item.is_status() {
                last_status = item
                    .to_string
                    .clone()
                    .or_else(|| item.to.clone())
                    .unwrap_or_default();
                events.push(StatusEvent {
                    issue_key: history.key.clone(),
                    change: ChangeKind::Status,
                    timestamp: batch.created,
                    status: last_status.clone(),
                    resolution: last_resolution.clone(),
                    is_resolved,
                });
            } else if item.is_resolution() {
                last_resolution = item.to_string.clone().filter(|s| !s.is_empty());
                if include_resolution_changes {
                    events.push(StatusEvent {
                        issue_key: history.key.clone(),
                        change: ChangeKind::Resolution,
                        timestamp: batch.created,
                        status: last_status.clone(),
                        resolution: last_resolution.clone(),
                        is_resolved,
                    });
                }
            }
        }
    }

    log::trace!("{}: replayed {} events", history.key, events.len());
    events
}

/// Status transitions only (the input the record builder needs)
pub fn replay_status_changes(history: &IssueHistory) -> Vec<StatusEvent> {
    replay(history, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldChange;
    use chrono::{DateTime, TimeZone, Utc};

    fn day(n: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, n, 9, 0, 0).unwrap()
    }

    fn change(field: &str, from: Option<&str>, to: Option<&str>) -> FieldChange {
        FieldChange {
            field: field.to_string(),
            from: None,
            from_string: from.map(str::to_string),
            to: to.map(str::to_string),
            to_string: to.map(str::to_string),
        }
    }

    #[test]
    fn test_no_changelog_yields_creation_event_only() {
        let history = IssueHistory::new("A-1", day(1), "In Progress");
        let events = replay(&history, true);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].change, ChangeKind::Created);
        assert_eq!(events[0].status, "In Progress");
        assert_eq!(events[0].timestamp, day(1));
        assert_eq!(events[0].resolution, None);
        assert!(!events[0].is_resolved);
    }

    #[test]
    fn test_initial_status_comes_from_earliest_transition() {
        let history = IssueHistory::new("A-1", day(1), "Done")
            .with_transition(day(3), "Open", "In Progress")
            .with_transition(day(5), "In Progress", "Done");
        let events = replay_status_changes(&history);
        let statuses: Vec<&str> = events.iter().map(|e| e.status.as_str()).collect();
        assert_eq!(statuses, vec!["Open", "In Progress", "Done"]);
        assert_eq!(events[1].timestamp, day(3));
        assert_eq!(events[2].timestamp, day(5));
    }

    #[test]
    fn test_batches_are_replayed_chronologically() {
        let history = IssueHistory::new("A-1", day(1), "Done")
            .with_transition(day(5), "In Progress", "Done")
            .with_transition(day(3), "Open", "In Progress");
        let events = replay_status_changes(&history);
        assert_eq!(events[0].status, "Open");
        assert_eq!(events[1].timestamp, day(3));
        assert_eq!(events[2].status, "Done");
    }

    #[test]
    fn test_resolution_carried_forward_and_sticky() {
        let mut history = IssueHistory::new("A-1", day(1), "Open");
        history.changelog.push(ChangeBatch {
            created: day(4),
            items: vec![
                change("status", Some("Open"), Some("Done")),
                change("resolution", None, Some("Fixed")),
            ],
        });
        history.changelog.push(ChangeBatch {
            created: day(6),
            items: vec![
                change("resolution", Some("Fixed"), None),
                change("status", Some("Done"), Some("Open")),
            ],
        });

        let events = replay(&history, true);
        assert_eq!(events.len(), 5);

        // Resolution is inspected before status events of the same batch
        assert_eq!(events[1].change, ChangeKind::Status);
        assert!(events[1].is_resolved);
        assert_eq!(events[1].resolution, None);

        assert_eq!(events[2].change, ChangeKind::Resolution);
        assert_eq!(events[2].status, "Done");
        assert_eq!(events[2].resolution.as_deref(), Some("Fixed"));
        assert_eq!(events[2].timestamp, day(4));

        // Cleared resolution does not flip the resolved flag back
        assert_eq!(events[3].change, ChangeKind::Resolution);
        assert_eq!(events[3].resolution, None);
        assert!(events[3].is_resolved);
        assert_eq!(events[4].status, "Open");
        assert!(events[4].is_resolved);
        assert_eq!(events[4].timestamp, day(6));
    }

    #[test]
    fn test_resolution_events_can_be_excluded() {
        let mut history = IssueHistory::new("A-1", day(1), "Done");
        history.changelog.push(ChangeBatch {
            created: day(2),
            items: vec![
                change("resolution", None, Some("Done")),
                change("status", Some("Open"), Some("Done")),
                change("assignee", None, Some("alex")),
            ],
        });
        let events = replay(&history, false);
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].resolution.as_deref(), Some("Done"));
        assert!(events[1].is_resolved);
    }

    #[test]
    fn test_replay_is_repeatable() {
        let history = IssueHistory::new("A-1", day(1), "Done")
            .with_transition(day(2), "Open", "Done");
        assert_eq!(replay(&history, true), replay(&history, true));
    }
}

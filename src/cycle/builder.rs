// Cycle record builder
//
// Folds an item's status events into one timestamp per workflow step, then
// walks the steps in cycle order to drop timestamps that go backwards and to
// derive cycle time.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{CycleDefinition, CycleRecord, StatusEvent, StepType};

/// A status that did not map onto any workflow step. Reported, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmappedStatus {
    pub key: String,
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// Record plus the diagnostics gathered while building it
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub record: CycleRecord,
    pub unmapped: Vec<UnmappedStatus>,
}

/// Build the cycle record for one item from its chronological events.
///
/// Each mapped event overwrites its step's timestamp, so a step keeps the
/// last time the item entered it. Metadata fields are left empty for the
/// caller to fill in.
pub fn build_record(key: &str, events: &[StatusEvent], cycle: &CycleDefinition) -> BuildOutcome {
    let mut record = CycleRecord::new(key, &cycle.step_names());
    let mut unmapped = Vec::new();

    for event in events {
        match cycle.resolve(&event.status) {
            Some(step) => record.steps[step.index].timestamp = Some(event.timestamp),
            None => {
                log::info!("{} transitioned to unknown status `{}`", key, event.status);
                unmapped.push(UnmappedStatus {
                    key: key.to_string(),
                    status: event.status.clone(),
                    timestamp: event.timestamp,
                });
            }
        }
    }

    let (accepted, completed) = enforce_monotonic(&mut record, cycle);
    if let (Some(accepted), Some(completed)) = (accepted, completed) {
        record.cycle_time = Some(completed - accepted);
        record.completed_timestamp = Some(completed);
    }

    BuildOutcome { record, unmapped }
}

/// Null out step timestamps that precede the last valid step in cycle order.
///
/// Only the immediately preceding valid timestamp is compared, not every
/// earlier step. Returns the first accepted-type and first complete-type
/// timestamps that survived the walk.
fn enforce_monotonic(
    record: &mut CycleRecord,
    cycle: &CycleDefinition,
) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    let mut previous: Option<DateTime<Utc>> = None;
    let mut accepted: Option<DateTime<Utc>> = None;
    let mut completed: Option<DateTime<Utc>> = None;

    for (slot, step) in record.steps.iter_mut().zip(cycle.steps()) {
        let Some(ts) = slot.timestamp else { continue };

        if previous.is_some_and(|prev| ts < prev) {
            log::debug!(
                "{}: dropping `{}` at {} (earlier than preceding step)",
                record.key, step.name, ts
            );
            slot.timestamp = None;
            continue;
        }

        previous = Some(ts);
        match step.step_type {
            StepType::Accepted if accepted.is_none() => accepted = Some(ts),
            StepType::Complete if completed.is_none() => completed = Some(ts),
            _ => {}
        }
    }

    (accepted, completed)
}

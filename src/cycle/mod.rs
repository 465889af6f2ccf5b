// Cycle data extraction: replay each item's history and fold it into a record

pub mod builder;
pub mod fields;
pub mod replay;

pub use builder::{build_record, BuildOutcome, UnmappedStatus};
pub use fields::{display_value, resolve_field_value};
pub use replay::{replay, replay_status_changes};

use std::collections::BTreeMap;

use crate::models::{CycleDefinition, CycleRecord, IssueHistory};

/// Metadata settings applied to every record
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Tracker base URL; records get `<domain>/browse/<key>` links when set
    pub domain: Option<String>,
    /// Logical attribute name -> source field id
    pub attributes: BTreeMap<String, String>,
}

/// Records for a batch of items, plus every status that failed to map
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub records: Vec<CycleRecord>,
    pub unmapped: Vec<UnmappedStatus>,
}

impl Extraction {
    /// Distinct unmapped status labels with how often each was seen
    pub fn unmapped_summary(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for u in &self.unmapped {
            *counts.entry(u.status.clone()).or_insert(0) += 1;
        }
        counts
    }
}

/// Build one record per item. Items are independent: a problem with one
/// item's history only degrades that item's record.
pub fn build_records(
    histories: &[IssueHistory],
    cycle: &CycleDefinition,
    options: &ExtractOptions,
) -> Extraction {
    let mut extraction = Extraction {
        records: Vec::with_capacity(histories.len()),
        unmapped: Vec::new(),
    };

    for history in histories {
        let events = replay_status_changes(history);
        let BuildOutcome { mut record, unmapped } = build_record(&history.key, &events, cycle);

        record.url = options
            .domain
            .as_ref()
            .map(|domain| format!("{}/browse/{}", domain.trim_end_matches('/'), history.key));
        record.issue_type = history.issue_type.clone();
        record.summary = history.summary.clone();
        record.status = history.status.clone();
        record.resolution = history.resolution.clone();
        for (name, field_id) in &options.attributes {
            record
                .fields
                .insert(name.clone(), resolve_field_value(history.fields.get(field_id)));
        }

        extraction.records.push(record);
        extraction.unmapped.extend(unmapped);
    }

    log::info!(
        "Built {} cycle records ({} completed, {} unmapped status events)",
        extraction.records.len(),
        extraction.records.iter().filter(|r| r.is_completed()).count(),
        extraction.unmapped.len()
    );
    extraction
}

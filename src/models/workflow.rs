use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::ConfigError;

/// Step type (what the step means for cycle time)
///
/// - Backlog: work not yet started
/// - Accepted: work started; the first accepted step reached starts the clock
/// - Complete: terminal; the first complete step reached stops the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepType {
    Backlog,
    Accepted,
    Complete,
}

impl StepType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepType::Backlog => "backlog",
            StepType::Accepted => "accepted",
            StepType::Complete => "complete",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "backlog" => Some(StepType::Backlog),
            "accepted" => Some(StepType::Accepted),
            "complete" => Some(StepType::Complete),
            _ => None,
        }
    }
}

/// One named stage of the pipeline and the raw tracker statuses that map onto it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub name: String,
    #[serde(rename = "type")]
    pub step_type: StepType,
    pub aliases: Vec<String>,
}

impl WorkflowStep {
    pub fn new(name: &str, step_type: StepType, aliases: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            step_type,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Resolved alias: where a raw status lands in the cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepRef {
    pub index: usize,
    pub step_type: StepType,
}

/// Ordered workflow steps plus the case-insensitive status lookup.
///
/// Only constructible through [`CycleDefinition::new`], so a value of this
/// type always satisfies the structural invariants: at least two steps, at
/// least one accepted and one complete step, unique step names and unique
/// aliases.
#[derive(Debug, Clone)]
pub struct CycleDefinition {
    steps: Vec<WorkflowStep>,
    lookup: HashMap<String, StepRef>,
}

impl CycleDefinition {
    pub fn new(steps: Vec<WorkflowStep>) -> Result<Self, ConfigError> {
        if steps.len() < 2 {
            return Err(ConfigError::TooFewSteps(steps.len()));
        }
        if !steps.iter().any(|s| s.step_type == StepType::Accepted) {
            return Err(ConfigError::MissingAcceptedStep);
        }
        if !steps.iter().any(|s| s.step_type == StepType::Complete) {
            return Err(ConfigError::MissingCompleteStep);
        }

        let mut names = HashSet::new();
        for step in &steps {
            if !names.insert(step.name.as_str()) {
                return Err(ConfigError::DuplicateStep(step.name.clone()));
            }
        }

        let mut lookup: HashMap<String, StepRef> = HashMap::new();
        for (index, step) in steps.iter().enumerate() {
            for alias in &step.aliases {
                let key = alias.to_lowercase();
                if let Some(existing) = lookup.get(&key) {
                    // The same alias listed twice under one step is harmless
                    if existing.index == index {
                        continue;
                    }
                    return Err(ConfigError::DuplicateAlias {
                        status: alias.clone(),
                        first: steps[existing.index].name.clone(),
                        second: step.name.clone(),
                    });
                }
                lookup.insert(key, StepRef { index, step_type: step.step_type });
            }
        }

        Ok(Self { steps, lookup })
    }

    pub fn steps(&self) -> &[WorkflowStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }

    /// Position of a step by name (exact match)
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.name == name)
    }

    /// Map a raw tracker status onto its step, ignoring case
    pub fn resolve(&self, status: &str) -> Option<StepRef> {
        self.lookup.get(&status.to_lowercase()).copied()
    }
}

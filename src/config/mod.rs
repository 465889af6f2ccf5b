// Configuration file loading
//
// Reads the TOML config (workflow, attributes, analysis settings) and turns
// it into a validated cycle definition plus extraction options.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::cycle::ExtractOptions;
use crate::error::ConfigError;
use crate::flow::Frequency;
use crate::models::{CycleDefinition, StepType, WorkflowStep};
use crate::stats::DEFAULT_QUANTILES;

/// A single status or a list of statuses
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConnectionSection {
    #[serde(default)]
    domain: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct WorkflowEntry {
    name: String,
    #[serde(default)]
    statuses: Option<OneOrMany>,
    #[serde(default, rename = "type")]
    step_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    connection: ConnectionSection,
    #[serde(default)]
    workflow: Vec<WorkflowEntry>,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
    #[serde(default)]
    analysis: AnalysisSettings,
}

/// Defaults for the aggregate and forecast commands
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalysisSettings {
    #[serde(default = "default_quantiles")]
    pub quantiles: Vec<f64>,
    #[serde(default = "default_bins")]
    pub bins: usize,
    #[serde(default = "default_trials")]
    pub trials: usize,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_quantiles() -> Vec<f64> {
    DEFAULT_QUANTILES.to_vec()
}

fn default_bins() -> usize {
    10
}

fn default_trials() -> usize {
    100
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            quantiles: default_quantiles(),
            bins: default_bins(),
            trials: default_trials(),
            frequency: Frequency::default(),
            seed: None,
        }
    }
}

/// Validated configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub cycle: CycleDefinition,
    pub extract: ExtractOptions,
    pub analysis: AnalysisSettings,
}

impl Config {
    /// Default config location: ~/.cycletime/config.toml
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".cycletime").join("config.toml"))
    }

    /// Explicit path if given, otherwise the default location
    pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
        match explicit {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::default_path()
                .context("No --config given and the home directory could not be determined"),
        }
    }

    /// Read and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml(&contents)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        log::debug!(
            "Loaded config from {} ({} workflow steps)",
            path.display(),
            config.cycle.len()
        );
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents).context("Failed to parse TOML")?;

        if let Some(q) = file.analysis.quantiles.iter().find(|q| !(0.0..=1.0).contains(*q)) {
            anyhow::bail!("Quantile {} is outside 0..1", q);
        }

        let cycle = cycle_from_entries(file.workflow)?;
        let extract = ExtractOptions {
            domain: file.connection.domain,
            attributes: file.attributes,
        };

        Ok(Self { cycle, extract, analysis: file.analysis })
    }
}

/// Build the cycle definition. Step types default by position: the first
/// step is backlog, the last is complete, the rest are accepted. A step with
/// no statuses maps its own name.
fn cycle_from_entries(entries: Vec<WorkflowEntry>) -> Result<CycleDefinition, ConfigError> {
    if entries.len() < 2 {
        return Err(ConfigError::TooFewSteps(entries.len()));
    }
    let last = entries.len() - 1;

    let mut steps = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.into_iter().enumerate() {
        let step_type = match entry.step_type.as_deref() {
            Some(s) => StepType::from_str(s).ok_or_else(|| ConfigError::UnknownStepType(s.to_string()))?,
            None if idx == 0 => StepType::Backlog,
            None if idx == last => StepType::Complete,
            None => StepType::Accepted,
        };
        let aliases = entry
            .statuses
            .map(OneOrMany::into_vec)
            .unwrap_or_else(|| vec![entry.name.clone()]);
        steps.push(WorkflowStep { name: entry.name, step_type, aliases });
    }

    CycleDefinition::new(steps)
}

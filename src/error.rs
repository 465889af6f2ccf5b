// Error types for the analytics core
//
// Structural configuration problems are fatal and surface as `ConfigError`.
// Everything that only affects a single item (unmapped statuses, missing
// fields) degrades that item's record instead of erroring.

use thiserror::Error;

/// Invalid cycle definition. Raised before any item is processed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("workflow must contain at least two steps (found {0})")]
    TooFewSteps(usize),

    #[error("workflow has no step of type `accepted`")]
    MissingAcceptedStep,

    #[error("workflow has no step of type `complete`")]
    MissingCompleteStep,

    #[error("workflow step name `{0}` is used more than once")]
    DuplicateStep(String),

    #[error("status `{status}` is mapped to both `{first}` and `{second}`")]
    DuplicateAlias {
        status: String,
        first: String,
        second: String,
    },

    #[error("unknown step type `{0}` (expected backlog, accepted or complete)")]
    UnknownStepType(String),

    #[error("unknown workflow step `{0}`")]
    UnknownStep(String),
}

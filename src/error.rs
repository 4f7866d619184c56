//! Error types for prompt-profiler
//!
//! Fatal conditions only. A single prompt failing inside a batch is not an
//! error: it is recorded as a failed `ScoredResult` and the run continues.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// prompt-profiler error types
#[derive(Error, Debug)]
pub enum Error {
    /// Experiment configuration is missing a required field or out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Experiment name not present in the loaded configuration set
    #[error(
        "Experiment '{0}' not found in config\n\
         Run `prompt-profiler list` to see available experiments."
    )]
    UnknownExperiment(String),

    /// Dataset holds no dialogs
    #[error("Dataset contains no dialogs")]
    EmptyDataset,

    /// Aggregator was handed zero results
    #[error("Cannot aggregate an empty batch: no results provided")]
    EmptyBatch,

    /// The batch request call itself failed (not a single prompt)
    #[error("Batch request failed: {0}")]
    BatchRequest(String),

    /// Batch request collaborator broke the one-outcome-per-prompt contract
    #[error("Batch request returned {actual} outcomes for {expected} prompts")]
    OutcomeCountMismatch {
        /// Number of prompts issued
        expected: usize,
        /// Number of outcomes returned
        actual: usize,
    },

    /// Writing or reading persisted results failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Whether this error aborts before any request is issued.
    #[must_use]
    pub const fn is_pre_request(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig(_) | Self::UnknownExperiment(_) | Self::EmptyDataset
        )
    }
}

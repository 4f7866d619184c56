//! Batch request collaborator
//!
//! The orchestrator never talks to a model API directly. It hands the whole
//! ordered prompt list to a [`BatchClient`] and receives one
//! [`RequestOutcome`] per prompt, in the same order. Implementations may
//! parallelize, retry or time out internally; the orchestrator only sees the
//! finished list.
//!
//! Two failure levels are distinguished:
//!
//! - a single prompt failing is a [`RequestOutcome::Failure`] in the list and
//!   does not abort the run;
//! - the call as a whole failing is an `Err` and aborts the run.

mod simulated;

pub use simulated::{SimulatedClient, SimulatedResponses};

use std::collections::BTreeMap;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::config::ExperimentConfig;
use crate::Result;

/// Usage key holding the total token count.
pub const TOTAL_TOKENS: &str = "total_tokens";

/// Token counts reported for one completion, keyed by counter name
/// (`input_tokens`, `output_tokens`, `total_tokens`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Usage(BTreeMap<String, u64>);

impl Usage {
    /// Empty usage record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Usage with input, output and total counters.
    #[must_use]
    pub fn from_counts(input_tokens: u64, output_tokens: u64) -> Self {
        Self::new()
            .with("input_tokens", input_tokens)
            .with("output_tokens", output_tokens)
            .with(TOTAL_TOKENS, input_tokens + output_tokens)
    }

    /// Set a counter.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: u64) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    /// Read a counter.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<u64> {
        self.0.get(key).copied()
    }

    /// Total tokens, treating a missing counter as zero.
    #[must_use]
    pub fn total_tokens(&self) -> u64 {
        self.get(TOTAL_TOKENS).unwrap_or(0)
    }

    /// Whether no counters are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Result of issuing one prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RequestOutcome {
    /// The model answered.
    Success {
        /// Completion text
        content: String,
        /// Token counters
        usage: Usage,
    },
    /// This prompt failed; the rest of the batch is unaffected.
    Failure {
        /// Error description
        error: String,
    },
}

impl RequestOutcome {
    /// Successful outcome.
    #[must_use]
    pub fn success(content: impl Into<String>, usage: Usage) -> Self {
        Self::Success {
            content: content.into(),
            usage,
        }
    }

    /// Failed outcome.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }

    /// Whether the request succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Issues a batch of prompts under one configuration.
///
/// Implementations must return exactly one outcome per prompt and keep
/// `outcomes[i]` aligned with `prompts[i]`.
pub trait BatchClient: Send + Sync {
    /// Issue every prompt and collect the outcomes in input order.
    fn request(
        &self,
        prompts: &[String],
        config: &ExperimentConfig,
    ) -> impl Future<Output = Result<Vec<RequestOutcome>>> + Send;
}

impl<T: BatchClient> BatchClient for std::sync::Arc<T> {
    fn request(
        &self,
        prompts: &[String],
        config: &ExperimentConfig,
    ) -> impl Future<Output = Result<Vec<RequestOutcome>>> + Send {
        (**self).request(prompts, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_missing_total_is_zero() {
        let usage = Usage::new().with("input_tokens", 4);
        assert_eq!(usage.total_tokens(), 0);
    }

    #[test]
    fn test_usage_from_counts() {
        let usage = Usage::from_counts(3, 7);
        assert_eq!(usage.total_tokens(), 10);
        assert_eq!(usage.get("output_tokens"), Some(7));
    }

    #[test]
    fn test_outcome_serialization_tagged() {
        let json = serde_json::to_value(RequestOutcome::failure("timeout")).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["error"], "timeout");
    }
}

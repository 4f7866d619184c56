//! Experiment Record - the persisted output of one run
//!
//! ```text
//! ExperimentRecord (1) ──< ScoredResult (N)   [index-aligned with the dataset]
//!        │
//!        └── ExperimentSummary                [flattened into the record]
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::client::Usage;
use crate::config::ExperimentConfig;
use crate::dataset::DialogItem;
use crate::grading::CoverageScore;
use crate::metrics::{ExperimentSummary, SummaryMap, SummaryValue};

/// One prompt's outcome together with its grading.
///
/// Failed requests are kept as placeholders with zero coverage, no refusal
/// and the error text, so `detailed_results[i]` always belongs to dialog `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    /// Position of the dialog in the dataset
    pub prompt_id: usize,
    /// Prompt that was sent
    pub prompt: String,
    /// Whether the request succeeded
    pub success: bool,
    /// Completion text (empty on failure)
    pub response: String,
    /// Facts the completion was expected to cover
    pub required_facts: Vec<String>,
    /// Coverage of `required_facts`
    pub score: CoverageScore,
    /// Whether the completion was classified as a refusal
    pub refusal: bool,
    /// Token counters reported by the client (empty on failure)
    pub usage: Usage,
    /// Error text for failed requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScoredResult {
    /// A graded successful response.
    #[must_use]
    pub fn graded(
        prompt_id: usize,
        dialog: &DialogItem,
        response: impl Into<String>,
        score: CoverageScore,
        refusal: bool,
        usage: Usage,
    ) -> Self {
        Self {
            prompt_id,
            prompt: dialog.prompt.clone(),
            success: true,
            response: response.into(),
            required_facts: dialog.expected_facts.clone(),
            score,
            refusal,
            usage,
            error: None,
        }
    }

    /// A zero-coverage placeholder for a failed request.
    #[must_use]
    pub fn failed(prompt_id: usize, dialog: &DialogItem, error: impl Into<String>) -> Self {
        Self {
            prompt_id,
            prompt: dialog.prompt.clone(),
            success: false,
            response: String::new(),
            required_facts: dialog.expected_facts.clone(),
            score: CoverageScore::zero(dialog.expected_facts.len()),
            refusal: false,
            usage: Usage::new(),
            error: Some(error.into()),
        }
    }

    /// Coverage fraction in `[0, 1]`.
    #[must_use]
    pub const fn coverage(&self) -> f64 {
        self.score.coverage
    }
}

/// The full result of one experiment run.
///
/// Immutable once built. Serializing the same instance twice yields identical
/// bytes; the timestamp is fixed at build time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentRecord {
    experiment_name: String,
    config_used: ExperimentConfig,
    timestamp: DateTime<Utc>,
    total_prompts: usize,
    #[serde(flatten)]
    summary: ExperimentSummary,
    detailed_results: Vec<ScoredResult>,
}

impl ExperimentRecord {
    /// Create a builder for a record.
    #[must_use]
    pub fn builder(
        experiment_name: impl Into<String>,
        config: ExperimentConfig,
        summary: ExperimentSummary,
    ) -> ExperimentRecordBuilder {
        ExperimentRecordBuilder::new(experiment_name, config, summary)
    }

    /// Get the experiment name.
    #[must_use]
    pub fn experiment_name(&self) -> &str {
        &self.experiment_name
    }

    /// Get the configuration the run used.
    #[must_use]
    pub const fn config(&self) -> &ExperimentConfig {
        &self.config_used
    }

    /// Get the assembly timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Get the number of prompts issued.
    #[must_use]
    pub const fn total_prompts(&self) -> usize {
        self.total_prompts
    }

    /// Get the number of successful responses.
    #[must_use]
    pub const fn successful_responses(&self) -> usize {
        self.summary.successful_responses
    }

    /// Get the aggregated metrics.
    #[must_use]
    pub const fn summary(&self) -> &ExperimentSummary {
        &self.summary
    }

    /// Get the per-prompt results, in dataset order.
    #[must_use]
    pub fn detailed_results(&self) -> &[ScoredResult] {
        &self.detailed_results
    }

    /// Results of failed requests.
    pub fn failures(&self) -> impl Iterator<Item = &ScoredResult> {
        self.detailed_results.iter().filter(|r| !r.success)
    }

    /// Flat metric map for the summary file.
    #[must_use]
    pub fn summary_map(&self) -> SummaryMap {
        let mut map = SummaryMap::new();
        let text = |s: &str| SummaryValue::Text(s.to_string());
        map.insert("experiment_name".into(), text(&self.experiment_name));
        map.insert("model".into(), text(&self.config_used.model));
        map.insert(
            "timestamp".into(),
            SummaryValue::Text(self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)),
        );
        map.insert(
            "total_prompts".into(),
            SummaryValue::Integer(self.total_prompts as u64),
        );
        map.insert(
            "successful_responses".into(),
            SummaryValue::Integer(self.summary.successful_responses as u64),
        );
        map.insert(
            "fact_coverage".into(),
            SummaryValue::Float(self.summary.fact_coverage),
        );
        map.insert(
            "refusal_rate".into(),
            SummaryValue::Float(self.summary.refusal_rate),
        );
        map.insert(
            "geometric_mean".into(),
            SummaryValue::Float(self.summary.geometric_mean),
        );
        map.insert(
            "total_tokens_used".into(),
            SummaryValue::Integer(self.summary.total_tokens_used),
        );
        map
    }
}

/// Builder for `ExperimentRecord`.
#[derive(Debug)]
pub struct ExperimentRecordBuilder {
    experiment_name: String,
    config: ExperimentConfig,
    summary: ExperimentSummary,
    total_prompts: Option<usize>,
    detailed_results: Vec<ScoredResult>,
    timestamp: Option<DateTime<Utc>>,
}

impl ExperimentRecordBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(
        experiment_name: impl Into<String>,
        config: ExperimentConfig,
        summary: ExperimentSummary,
    ) -> Self {
        Self {
            experiment_name: experiment_name.into(),
            config,
            summary,
            total_prompts: None,
            detailed_results: Vec::new(),
            timestamp: None,
        }
    }

    /// Set the per-prompt results.
    #[must_use]
    pub fn detailed_results(mut self, results: Vec<ScoredResult>) -> Self {
        self.detailed_results = results;
        self
    }

    /// Override the prompt count (defaults to the number of results).
    #[must_use]
    pub const fn total_prompts(mut self, total_prompts: usize) -> Self {
        self.total_prompts = Some(total_prompts);
        self
    }

    /// Set a fixed timestamp (useful for deserialization/testing).
    #[must_use]
    pub const fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Build the `ExperimentRecord`, stamping it now unless a timestamp was set.
    #[must_use]
    pub fn build(self) -> ExperimentRecord {
        ExperimentRecord {
            experiment_name: self.experiment_name,
            config_used: self.config,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            total_prompts: self.total_prompts.unwrap_or(self.detailed_results.len()),
            summary: self.summary,
            detailed_results: self.detailed_results,
        }
    }
}

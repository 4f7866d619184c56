//! Run-level metrics
//!
//! Folds per-prompt [`ScoredResult`]s into one [`ExperimentSummary`].
//! Statistics are computed over successful results only; failed prompts are
//! counted in the record but never drag coverage down.
//!
//! ## Zero-success convention
//!
//! An empty input is an error ([`Error::EmptyBatch`]): a run with no prompts
//! is a dataset problem. A non-empty input where every request failed is
//! *not* an error: coverage, refusal rate, health score and token total are
//! all zero so the run stays reportable.
//!
//! ## Health score
//!
//! `geometric_mean = sqrt(max(fact_coverage * (1 - refusal_rate), 0))`,
//! rounded to 4 decimals. It rewards high coverage and low refusal at the
//! same time.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::record::ScoredResult;

/// Aggregate statistics over one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExperimentSummary {
    /// Mean coverage over successes, rounded to 4 decimals
    pub fact_coverage: f64,
    /// Fraction of successes flagged as refusals, rounded to 4 decimals
    pub refusal_rate: f64,
    /// Combined health score, rounded to 4 decimals
    pub geometric_mean: f64,
    /// Number of successful responses
    pub successful_responses: usize,
    /// Sum of `total_tokens` over successes
    pub total_tokens_used: u64,
}

/// Summarize a batch of scored results.
///
/// # Errors
///
/// Returns [`Error::EmptyBatch`] if `results` is empty.
pub fn aggregate(results: &[ScoredResult]) -> Result<ExperimentSummary> {
    if results.is_empty() {
        return Err(Error::EmptyBatch);
    }

    let successes: Vec<&ScoredResult> = results.iter().filter(|r| r.success).collect();
    if successes.is_empty() {
        return Ok(ExperimentSummary {
            fact_coverage: 0.0,
            refusal_rate: 0.0,
            geometric_mean: 0.0,
            successful_responses: 0,
            total_tokens_used: 0,
        });
    }

    #[allow(clippy::cast_precision_loss)]
    let count = successes.len() as f64;
    let coverage_mean = successes.iter().map(|r| r.score.coverage).sum::<f64>() / count;
    #[allow(clippy::cast_precision_loss)]
    let refusal_rate = successes.iter().filter(|r| r.refusal).count() as f64 / count;
    let total_tokens_used = successes.iter().map(|r| r.usage.total_tokens()).sum();

    Ok(ExperimentSummary {
        fact_coverage: round4(coverage_mean),
        refusal_rate: round4(refusal_rate),
        geometric_mean: geometric_mean(coverage_mean, refusal_rate),
        successful_responses: successes.len(),
        total_tokens_used,
    })
}

/// `sqrt(max(coverage * (1 - refusal_rate), 0))` rounded to 4 decimals.
#[must_use]
pub fn geometric_mean(fact_coverage: f64, refusal_rate: f64) -> f64 {
    round4((fact_coverage * (1.0 - refusal_rate)).max(0.0).sqrt())
}

/// Round to 4 decimal places.
#[must_use]
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// A value in the summary file: a number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SummaryValue {
    /// Whole-number metric (counts, token totals)
    Integer(u64),
    /// Fractional metric
    Float(f64),
    /// Label (experiment name, model, timestamp)
    Text(String),
}

impl SummaryValue {
    /// Numeric view, if any.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for SummaryValue {
    /// Numbers with 4 decimals, strings verbatim.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            other => write!(f, "{:.4}", other.as_f64().unwrap_or_default()),
        }
    }
}

/// Metric name to value, as written to `summary.json`.
pub type SummaryMap = BTreeMap<String, SummaryValue>;

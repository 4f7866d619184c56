//! Experiment configuration
//!
//! Configuration files declare named experiments under a top-level
//! `experiments:` key:
//!
//! ```yaml
//! experiments:
//!   baseline:
//!     model: claude-3-haiku
//!     temperature: 0.2
//!     max_tokens: 512
//!   creative:
//!     model: claude-3-haiku
//!     temperature: 0.9
//!     max_tokens: 1024
//!     top_p: 0.95
//!     seed: 7          # unknown keys land in `extra`
//! ```
//!
//! Entries are parsed into [`RawExperimentConfig`], where the three required
//! fields are optional so that a missing field surfaces as
//! [`Error::InvalidConfig`] naming that field. [`RawExperimentConfig::validate`]
//! turns a raw entry into a checked [`ExperimentConfig`].

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Inclusive temperature range accepted by [`RawExperimentConfig::validate`].
pub const TEMPERATURE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=1.0;

/// Sampling options understood by the request collaborator.
///
/// Anything not listed here is kept verbatim in the config's `extra` map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelOptions {
    /// Nucleus sampling cutoff
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Top-k sampling cutoff
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// Sequences that stop generation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop_sequences: Vec<String>,
    /// System prompt sent with every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
}

/// Experiment configuration as written in the config file, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawExperimentConfig {
    /// Model identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Completion token limit; signed so negatives are range errors, not parse errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i64>,
    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Known optional parameters
    #[serde(flatten)]
    pub options: ModelOptions,
    /// Free-form parameters kept for forward compatibility
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl RawExperimentConfig {
    /// Check required fields and ranges, producing a typed config.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `model`, `temperature` or
    /// `max_tokens` is missing, if the model is blank, if temperature is
    /// outside `[0.0, 1.0]`, or if `max_tokens` is not positive.
    pub fn validate(&self) -> Result<ExperimentConfig> {
        let model = self
            .model
            .as_deref()
            .ok_or_else(|| missing("model"))?;
        let temperature = self.temperature.ok_or_else(|| missing("temperature"))?;
        let max_tokens = self.max_tokens.ok_or_else(|| missing("max_tokens"))?;

        if model.trim().is_empty() {
            return Err(Error::InvalidConfig("model must not be empty".to_string()));
        }
        if !TEMPERATURE_RANGE.contains(&temperature) {
            return Err(Error::InvalidConfig(format!(
                "temperature must be between 0.0 and 1.0, got: {temperature}"
            )));
        }
        if max_tokens <= 0 {
            return Err(Error::InvalidConfig(format!(
                "max_tokens must be positive, got: {max_tokens}"
            )));
        }
        let max_tokens = u32::try_from(max_tokens).map_err(|_| {
            Error::InvalidConfig(format!("max_tokens too large, got: {max_tokens}"))
        })?;

        Ok(ExperimentConfig {
            model: model.to_string(),
            max_tokens,
            temperature,
            options: self.options.clone(),
            extra: self.extra.clone(),
        })
    }
}

fn missing(field: &str) -> Error {
    Error::InvalidConfig(format!("missing required field in config: {field}"))
}

/// A validated experiment configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Model identifier
    pub model: String,
    /// Completion token limit (always positive)
    pub max_tokens: u32,
    /// Sampling temperature in `[0.0, 1.0]`
    pub temperature: f64,
    /// Known optional parameters
    #[serde(flatten)]
    pub options: ModelOptions,
    /// Free-form parameters
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ExperimentConfig {
    /// Build and validate a config from the three required fields.
    ///
    /// # Errors
    ///
    /// Same conditions as [`RawExperimentConfig::validate`].
    pub fn new(model: impl Into<String>, max_tokens: i64, temperature: f64) -> Result<Self> {
        RawExperimentConfig {
            model: Some(model.into()),
            max_tokens: Some(max_tokens),
            temperature: Some(temperature),
            ..RawExperimentConfig::default()
        }
        .validate()
    }

    /// Attach a free-form parameter.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

impl From<ExperimentConfig> for RawExperimentConfig {
    fn from(config: ExperimentConfig) -> Self {
        Self {
            model: Some(config.model),
            max_tokens: Some(i64::from(config.max_tokens)),
            temperature: Some(config.temperature),
            options: config.options,
            extra: config.extra,
        }
    }
}

/// Named experiments in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExperimentSet {
    experiments: Vec<(String, RawExperimentConfig)>,
}

#[derive(Deserialize)]
struct ConfigFile {
    #[serde(default)]
    experiments: serde_yaml::Mapping,
}

impl ExperimentSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML config document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Yaml`] on malformed YAML, or [`Error::InvalidConfig`]
    /// if no experiments are declared or a name is not a string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(yaml)?;
        if file.experiments.is_empty() {
            return Err(Error::InvalidConfig(
                "no experiments found in configuration".to_string(),
            ));
        }

        let mut set = Self::new();
        for (key, value) in file.experiments {
            let name = key.as_str().map(str::to_string).ok_or_else(|| {
                Error::InvalidConfig(format!("experiment name must be a string, got: {key:?}"))
            })?;
            let raw: RawExperimentConfig = serde_yaml::from_value(value)?;
            set.insert(name, raw);
        }
        Ok(set)
    }

    /// Read and parse a YAML config file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, otherwise as
    /// [`ExperimentSet::from_yaml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Add or replace an experiment, keeping its original position on replace.
    pub fn insert(&mut self, name: impl Into<String>, config: impl Into<RawExperimentConfig>) {
        let name = name.into();
        let config = config.into();
        match self.experiments.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = config,
            None => self.experiments.push((name, config)),
        }
    }

    /// Look up an experiment by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RawExperimentConfig> {
        self.experiments
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, config)| config)
    }

    /// Experiment names in declaration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.experiments.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Number of experiments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.experiments.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }
}

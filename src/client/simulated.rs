//! Offline batch client that replays canned responses.
//!
//! Used by the CLI when no live client is wired in, and by tests. Usage is
//! derived deterministically from whitespace word counts so repeated runs
//! produce identical records apart from the timestamp.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{BatchClient, RequestOutcome, Usage};
use crate::config::ExperimentConfig;
use crate::error::{Error, Result};

/// Canned responses as stored on disk.
///
/// ```json
/// {
///   "responses": {"What is the capital of France?": "Paris is the capital."},
///   "failures": {"Explode please": "simulated rate limit"},
///   "default_response": "I don't know."
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatedResponses {
    /// Completion per prompt
    #[serde(default)]
    pub responses: BTreeMap<String, String>,
    /// Per-prompt failures; take precedence over `responses`
    #[serde(default)]
    pub failures: BTreeMap<String, String>,
    /// Completion for prompts with no entry; without it those prompts fail
    #[serde(default)]
    pub default_response: Option<String>,
}

/// A [`BatchClient`] that answers from [`SimulatedResponses`].
#[derive(Debug, Clone, Default)]
pub struct SimulatedClient {
    responses: SimulatedResponses,
    batch_error: Option<String>,
}

impl SimulatedClient {
    /// Create a client from canned responses.
    #[must_use]
    pub const fn new(responses: SimulatedResponses) -> Self {
        Self {
            responses,
            batch_error: None,
        }
    }

    /// Load canned responses from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] or [`Error::Json`] if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(Self::new(serde_json::from_str(&json)?))
    }

    /// Add a canned completion for a prompt.
    #[must_use]
    pub fn respond(mut self, prompt: impl Into<String>, completion: impl Into<String>) -> Self {
        self.responses
            .responses
            .insert(prompt.into(), completion.into());
        self
    }

    /// Make one prompt fail.
    #[must_use]
    pub fn fail(mut self, prompt: impl Into<String>, error: impl Into<String>) -> Self {
        self.responses.failures.insert(prompt.into(), error.into());
        self
    }

    /// Answer unknown prompts with a fixed completion.
    #[must_use]
    pub fn with_default_response(mut self, completion: impl Into<String>) -> Self {
        self.responses.default_response = Some(completion.into());
        self
    }

    /// Make the whole batch call fail.
    #[must_use]
    pub fn fail_batch(mut self, error: impl Into<String>) -> Self {
        self.batch_error = Some(error.into());
        self
    }

    fn answer(&self, prompt: &str, config: &ExperimentConfig) -> RequestOutcome {
        if let Some(error) = self.responses.failures.get(prompt) {
            return RequestOutcome::failure(error.clone());
        }

        let completion = self
            .responses
            .responses
            .get(prompt)
            .or(self.responses.default_response.as_ref());

        match completion {
            Some(content) => {
                let input_tokens = word_count(prompt);
                let output_tokens = word_count(content).min(u64::from(config.max_tokens));
                RequestOutcome::success(
                    content.clone(),
                    Usage::from_counts(input_tokens, output_tokens),
                )
            }
            None => RequestOutcome::failure(format!("no simulated response for prompt: {prompt}")),
        }
    }
}

fn word_count(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}

impl BatchClient for SimulatedClient {
    async fn request(
        &self,
        prompts: &[String],
        config: &ExperimentConfig,
    ) -> Result<Vec<RequestOutcome>> {
        if let Some(error) = &self.batch_error {
            return Err(Error::BatchRequest(error.clone()));
        }

        tracing::debug!(model = %config.model, prompts = prompts.len(), "simulated batch");
        Ok(prompts
            .iter()
            .map(|prompt| self.answer(prompt, config))
            .collect())
    }
}

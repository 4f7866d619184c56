//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Mutex;

use prompt_profiler::{
    BatchClient, Dataset, DialogItem, Error, ExperimentConfig, ExperimentRecord, ExperimentSet,
    RecordStore, RequestOutcome, Result, Usage,
};

/// Returns a fixed outcome list regardless of the prompts, and remembers
/// what it was asked.
#[derive(Debug, Default)]
pub struct ScriptedClient {
    outcomes: Vec<RequestOutcome>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedClient {
    pub fn new(outcomes: Vec<RequestOutcome>) -> Self {
        Self {
            outcomes,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl BatchClient for ScriptedClient {
    async fn request(
        &self,
        prompts: &[String],
        _config: &ExperimentConfig,
    ) -> Result<Vec<RequestOutcome>> {
        self.calls.lock().unwrap().push(prompts.to_vec());
        Ok(self.outcomes.clone())
    }
}

/// A store whose writes always fail.
#[derive(Debug, Default)]
pub struct FailingStore;

impl RecordStore for FailingStore {
    fn save(&self, _experiment_name: &str, _record: &ExperimentRecord) -> Result<()> {
        Err(Error::Persistence("read-only filesystem".to_string()))
    }
}

pub fn ok(content: &str, total_tokens: u64) -> RequestOutcome {
    RequestOutcome::success(content, Usage::new().with("total_tokens", total_tokens))
}

pub fn fail(error: &str) -> RequestOutcome {
    RequestOutcome::failure(error)
}

pub fn experiments() -> ExperimentSet {
    let mut set = ExperimentSet::new();
    set.insert("exp", ExperimentConfig::new("x", 100, 0.5).unwrap());
    set
}

pub fn dataset(n: usize) -> Dataset {
    Dataset::new(
        (0..n)
            .map(|i| DialogItem::new(format!("prompt-{i}"), [format!("fact-{i}")]))
            .collect(),
    )
}

//! Experiment orchestration
//!
//! Drives one named experiment from configuration and dataset to a persisted
//! [`ExperimentRecord`]:
//!
//! 1. resolve the experiment name ([`Error::UnknownExperiment`])
//! 2. validate its config ([`Error::InvalidConfig`])
//! 3. check the dataset ([`Error::EmptyDataset`])
//! 4. issue every prompt in one batch call
//! 5. grade successes; turn failures into zero-score placeholders
//! 6. aggregate
//! 7. assemble the record (timestamped now)
//! 8. save it
//!
//! Steps 1-3 happen before any request is issued. After that, a failed prompt
//! never aborts the run; only the batch call itself, the aggregator or the
//! store can, and their errors are returned unchanged.
//!
//! ```rust
//! use prompt_profiler::{
//!     Dataset, DialogItem, ExperimentConfig, ExperimentOrchestrator, ExperimentSet,
//!     MemoryRecordStore, SimulatedClient,
//! };
//!
//! # async fn example() -> prompt_profiler::Result<()> {
//! let mut experiments = ExperimentSet::new();
//! experiments.insert("baseline", ExperimentConfig::new("sim-1", 100, 0.5)?);
//! let dataset = Dataset::new(vec![DialogItem::new("A", ["cat"])]);
//!
//! let client = SimulatedClient::default().respond("A", "a cat sat");
//! let orchestrator = ExperimentOrchestrator::new(client, MemoryRecordStore::new());
//!
//! let record = orchestrator.run("baseline", &experiments, &dataset).await?;
//! assert_eq!(record.successful_responses(), 1);
//! # Ok(())
//! # }
//! ```

use crate::client::{BatchClient, RequestOutcome};
use crate::config::{ExperimentConfig, ExperimentSet, RawExperimentConfig};
use crate::dataset::{Dataset, DialogItem};
use crate::error::{Error, Result};
use crate::events::{EventSink, RunEvent, TracingSink};
use crate::grading::GradingEngine;
use crate::metrics;
use crate::record::{ExperimentRecord, ScoredResult};
use crate::state::RunState;
use crate::storage::RecordStore;

/// Runs experiments against an injected batch client and record store.
#[derive(Debug)]
pub struct ExperimentOrchestrator<C, S, E = TracingSink> {
    client: C,
    store: S,
    events: E,
    grader: GradingEngine,
}

impl<C, S> ExperimentOrchestrator<C, S, TracingSink>
where
    C: BatchClient,
    S: RecordStore,
{
    /// Create an orchestrator that logs through `tracing` and grades with
    /// the default refusal phrases.
    #[must_use]
    pub fn new(client: C, store: S) -> Self {
        Self {
            client,
            store,
            events: TracingSink,
            grader: GradingEngine::default(),
        }
    }
}

impl<C, S, E> ExperimentOrchestrator<C, S, E>
where
    C: BatchClient,
    S: RecordStore,
    E: EventSink,
{
    /// Replace the event sink.
    #[must_use]
    pub fn with_events<E2: EventSink>(self, events: E2) -> ExperimentOrchestrator<C, S, E2> {
        ExperimentOrchestrator {
            client: self.client,
            store: self.store,
            events,
            grader: self.grader,
        }
    }

    /// Replace the grader (e.g. to extend the refusal phrase set).
    #[must_use]
    pub fn with_grader(mut self, grader: GradingEngine) -> Self {
        self.grader = grader;
        self
    }

    /// The record store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The event sink.
    pub const fn events(&self) -> &E {
        &self.events
    }

    /// Check a raw config before anything is requested.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] describing the first violation.
    pub fn validate(&self, config: &RawExperimentConfig) -> Result<ExperimentConfig> {
        config.validate()
    }

    /// Run `experiment_name` from `experiments` over `dataset` and persist the record.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownExperiment`], [`Error::InvalidConfig`],
    ///   [`Error::EmptyDataset`] before any request is issued
    /// - [`Error::BatchRequest`] or [`Error::OutcomeCountMismatch`] if the
    ///   batch call fails as a whole
    /// - whatever the store returns from `save`
    pub async fn run(
        &self,
        experiment_name: &str,
        experiments: &ExperimentSet,
        dataset: &Dataset,
    ) -> Result<ExperimentRecord> {
        let mut state = RunState::Validating;

        let config = match self.resolve(experiment_name, experiments, dataset) {
            Ok(config) => config,
            Err(err) => {
                self.transition(experiment_name, &mut state, RunState::reject);
                return Err(self.abort(experiment_name, err));
            }
        };

        let prompts = dataset.prompts();
        self.events.record(RunEvent::Started {
            experiment: experiment_name.to_string(),
            model: config.model.clone(),
            prompts: prompts.len(),
        });

        self.transition(experiment_name, &mut state, RunState::advance);
        let outcomes = match self.request(&prompts, &config).await {
            Ok(outcomes) => outcomes,
            Err(err) => return Err(self.abort(experiment_name, err)),
        };

        self.transition(experiment_name, &mut state, RunState::advance);
        let results = self.grade(dataset.dialogs(), outcomes);

        self.transition(experiment_name, &mut state, RunState::advance);
        let summary = match metrics::aggregate(&results) {
            Ok(summary) => summary,
            Err(err) => return Err(self.abort(experiment_name, err)),
        };

        let record = ExperimentRecord::builder(experiment_name, config, summary)
            .total_prompts(prompts.len())
            .detailed_results(results)
            .build();
        self.events.record(RunEvent::Completed {
            experiment: experiment_name.to_string(),
            fact_coverage: summary.fact_coverage,
            refusal_rate: summary.refusal_rate,
            successful_responses: summary.successful_responses,
            total_prompts: record.total_prompts(),
        });

        self.transition(experiment_name, &mut state, RunState::advance);
        if let Err(err) = self.store.save(experiment_name, &record) {
            return Err(self.abort(experiment_name, err));
        }
        self.events.record(RunEvent::Saved {
            experiment: experiment_name.to_string(),
        });

        self.transition(experiment_name, &mut state, RunState::advance);
        Ok(record)
    }

    /// Grade outcomes against their dialogs, index for index.
    ///
    /// `outcomes[i]` is graded against `dialogs[i]`; the result at position
    /// `i` always has `prompt_id == i`.
    pub fn grade(
        &self,
        dialogs: &[DialogItem],
        outcomes: Vec<RequestOutcome>,
    ) -> Vec<ScoredResult> {
        dialogs
            .iter()
            .zip(outcomes)
            .enumerate()
            .map(|(prompt_id, (dialog, outcome))| match outcome {
                RequestOutcome::Success { content, usage } => {
                    let score = self.grader.score_coverage(&dialog.expected_facts, &content);
                    let refusal = self.grader.detect_refusal(&content, &dialog.metadata);
                    self.events.record(RunEvent::ItemGraded {
                        prompt_id,
                        coverage: score.coverage,
                        refusal,
                    });
                    ScoredResult::graded(prompt_id, dialog, content, score, refusal, usage)
                }
                RequestOutcome::Failure { error } => {
                    self.events.record(RunEvent::ItemFailed {
                        prompt_id,
                        error: error.clone(),
                    });
                    ScoredResult::failed(prompt_id, dialog, error)
                }
            })
            .collect()
    }

    fn resolve(
        &self,
        experiment_name: &str,
        experiments: &ExperimentSet,
        dataset: &Dataset,
    ) -> Result<ExperimentConfig> {
        let raw = experiments
            .get(experiment_name)
            .ok_or_else(|| Error::UnknownExperiment(experiment_name.to_string()))?;
        let config = self.validate(raw)?;
        if dataset.is_empty() {
            return Err(Error::EmptyDataset);
        }
        Ok(config)
    }

    async fn request(
        &self,
        prompts: &[String],
        config: &ExperimentConfig,
    ) -> Result<Vec<RequestOutcome>> {
        let outcomes = self.client.request(prompts, config).await?;
        if outcomes.len() != prompts.len() {
            return Err(Error::OutcomeCountMismatch {
                expected: prompts.len(),
                actual: outcomes.len(),
            });
        }
        Ok(outcomes)
    }

    fn transition(
        &self,
        experiment_name: &str,
        state: &mut RunState,
        step: fn(RunState) -> RunState,
    ) {
        let from = *state;
        *state = step(from);
        if *state != from {
            self.events.record(RunEvent::StateChanged {
                experiment: experiment_name.to_string(),
                from,
                to: *state,
            });
        }
    }

    fn abort(&self, experiment_name: &str, err: Error) -> Error {
        self.events.record(RunEvent::Aborted {
            experiment: experiment_name.to_string(),
            reason: err.to_string(),
        });
        err
    }
}

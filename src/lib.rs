//! # prompt-profiler: Scripted LLM Prompt Experiments
//!
//! Runs a batch of prompts under a named configuration (model, temperature,
//! token limit), grades every completion against the facts it should
//! mention, folds the grades into run-level metrics and persists the result.
//!
//! ## Pipeline
//!
//! ```text
//! ExperimentSet + Dataset
//!        │
//!        ▼
//!   validate ──► BatchClient::request ──► GradingEngine ──► metrics::aggregate
//!                                                                 │
//!                                                                 ▼
//!                                              ExperimentRecord ──► RecordStore
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use prompt_profiler::{
//!     Dataset, ExperimentOrchestrator, ExperimentSet, JsonFileStore, SimulatedClient,
//! };
//!
//! # async fn example() -> prompt_profiler::Result<()> {
//! let experiments = ExperimentSet::load("experiments.yaml")?;
//! let dataset = Dataset::load("dialogs.json")?;
//! let client = SimulatedClient::from_file("responses.json")?;
//!
//! let orchestrator = ExperimentOrchestrator::new(client, JsonFileStore::new("results"));
//! let record = orchestrator.run("baseline", &experiments, &dataset).await?;
//! println!("coverage: {:.4}", record.summary().fact_coverage);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod client;
pub mod config;
pub mod dataset;
pub mod error;
pub mod events;
pub mod grading;
pub mod metrics;
pub mod orchestrator;
pub mod record;
pub mod state;
pub mod storage;

pub use client::{BatchClient, RequestOutcome, SimulatedClient, Usage};
pub use config::{ExperimentConfig, ExperimentSet, ModelOptions, RawExperimentConfig};
pub use dataset::{Dataset, DialogItem};
pub use error::{Error, Result};
pub use events::{EventSink, MemorySink, RunEvent, TracingSink};
pub use grading::{CoverageScore, GradingEngine, RefusalPhrases};
pub use metrics::{ExperimentSummary, SummaryMap, SummaryValue};
pub use orchestrator::ExperimentOrchestrator;
pub use record::{ExperimentRecord, ExperimentRecordBuilder, ScoredResult};
pub use state::RunState;
pub use storage::{JsonFileStore, MemoryRecordStore, RecordStore};

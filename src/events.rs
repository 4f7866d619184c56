//! Structured run events
//!
//! The orchestrator reports progress through an injected [`EventSink`]
//! instead of configuring process-wide logging itself. [`TracingSink`]
//! forwards events to `tracing`; [`MemorySink`] keeps them for inspection.

use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::state::RunState;

/// Something that happened during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    /// Lifecycle transition.
    StateChanged {
        /// Experiment name
        experiment: String,
        /// Previous state
        from: RunState,
        /// New state
        to: RunState,
    },
    /// Config validated, batch about to be issued.
    Started {
        /// Experiment name
        experiment: String,
        /// Model identifier
        model: String,
        /// Number of prompts
        prompts: usize,
    },
    /// One successful response was graded.
    ItemGraded {
        /// Dialog index
        prompt_id: usize,
        /// Coverage fraction
        coverage: f64,
        /// Refusal flag
        refusal: bool,
    },
    /// One request failed; the run continues.
    ItemFailed {
        /// Dialog index
        prompt_id: usize,
        /// Error text
        error: String,
    },
    /// Summary computed and record assembled.
    Completed {
        /// Experiment name
        experiment: String,
        /// Mean coverage over successes
        fact_coverage: f64,
        /// Refusal rate over successes
        refusal_rate: f64,
        /// Successful responses
        successful_responses: usize,
        /// Prompts issued
        total_prompts: usize,
    },
    /// Record handed to the store.
    Saved {
        /// Experiment name
        experiment: String,
    },
    /// Run aborted by a fatal error.
    Aborted {
        /// Experiment name
        experiment: String,
        /// Error text
        reason: String,
    },
}

/// Receiver for run events.
pub trait EventSink: Send + Sync {
    /// Record one event.
    fn record(&self, event: RunEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: RunEvent) {
        match event {
            RunEvent::StateChanged {
                experiment,
                from,
                to,
            } => tracing::debug!(%experiment, %from, %to, "state changed"),
            RunEvent::Started {
                experiment,
                model,
                prompts,
            } => tracing::info!(%experiment, %model, prompts, "starting experiment"),
            RunEvent::ItemGraded {
                prompt_id,
                coverage,
                refusal,
            } => tracing::info!(prompt_id, coverage, refusal, "prompt graded"),
            RunEvent::ItemFailed { prompt_id, error } => {
                tracing::warn!(prompt_id, %error, "prompt failed");
            }
            RunEvent::Completed {
                experiment,
                fact_coverage,
                refusal_rate,
                successful_responses,
                total_prompts,
            } => tracing::info!(
                %experiment,
                fact_coverage,
                refusal_rate,
                successful_responses,
                total_prompts,
                "experiment completed"
            ),
            RunEvent::Saved { experiment } => tracing::info!(%experiment, "results saved"),
            RunEvent::Aborted { experiment, reason } => {
                tracing::error!(%experiment, %reason, "experiment aborted");
            }
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<RunEvent>>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<RunEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// States entered, in order.
    #[must_use]
    pub fn states(&self) -> Vec<RunState> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RunEvent::StateChanged { to, .. } => Some(to),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: RunEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl<T: EventSink + ?Sized> EventSink for std::sync::Arc<T> {
    fn record(&self, event: RunEvent) {
        (**self).record(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_collects_states() {
        let sink = MemorySink::new();
        sink.record(RunEvent::StateChanged {
            experiment: "e".to_string(),
            from: RunState::Validating,
            to: RunState::Requesting,
        });
        sink.record(RunEvent::Saved {
            experiment: "e".to_string(),
        });
        assert_eq!(sink.events().len(), 2);
        assert_eq!(sink.states(), vec![RunState::Requesting]);
    }

    #[test]
    fn test_event_serializes_tagged() {
        let json = serde_json::to_value(RunEvent::ItemFailed {
            prompt_id: 2,
            error: "boom".to_string(),
        })
        .unwrap();
        assert_eq!(json["event"], "item_failed");
        assert_eq!(json["prompt_id"], 2);
    }
}

//! Run lifecycle
//!
//! ```text
//! Validating ─► Requesting ─► Grading ─► Aggregating ─► Persisting ─► Done
//!     │
//!     └─► Failed
//! ```
//!
//! Only `Validating` can reject a run. Later states handle per-prompt
//! failures as data; errors raised by collaborators there (the batch call
//! itself, the store) propagate to the caller as they are.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Phase of an experiment run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Resolving the experiment, checking config and dataset.
    Validating,
    /// Batch request in flight.
    Requesting,
    /// Scoring each outcome.
    Grading,
    /// Folding scores into the summary.
    Aggregating,
    /// Handing the record to the store.
    Persisting,
    /// Record persisted.
    Done,
    /// Rejected during validation; no request was issued.
    Failed,
}

impl RunState {
    /// Next state on the success path. Terminal states stay put.
    #[must_use]
    pub const fn advance(self) -> Self {
        match self {
            Self::Validating => Self::Requesting,
            Self::Requesting => Self::Grading,
            Self::Grading => Self::Aggregating,
            Self::Aggregating => Self::Persisting,
            Self::Persisting | Self::Done => Self::Done,
            Self::Failed => Self::Failed,
        }
    }

    /// State after a validation failure. Outside `Validating` this is a no-op.
    #[must_use]
    pub const fn reject(self) -> Self {
        match self {
            Self::Validating => Self::Failed,
            other => other,
        }
    }

    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Lowercase name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validating => "validating",
            Self::Requesting => "requesting",
            Self::Grading => "grading",
            Self::Aggregating => "aggregating",
            Self::Persisting => "persisting",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_path() {
        let mut state = RunState::Validating;
        let mut seen = vec![state];
        while !state.is_terminal() {
            state = state.advance();
            seen.push(state);
        }
        assert_eq!(
            seen,
            vec![
                RunState::Validating,
                RunState::Requesting,
                RunState::Grading,
                RunState::Aggregating,
                RunState::Persisting,
                RunState::Done,
            ]
        );
    }

    #[test]
    fn test_reject_only_from_validating() {
        assert_eq!(RunState::Validating.reject(), RunState::Failed);
        assert_eq!(RunState::Grading.reject(), RunState::Grading);
        assert_eq!(RunState::Done.reject(), RunState::Done);
    }

    #[test]
    fn test_terminal_states_absorb() {
        assert_eq!(RunState::Failed.advance(), RunState::Failed);
        assert_eq!(RunState::Done.advance(), RunState::Done);
    }
}

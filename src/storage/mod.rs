//! Persistence collaborator
//!
//! The orchestrator hands each finished [`ExperimentRecord`] to a
//! [`RecordStore`]. Stores key records by experiment name and overwrite on
//! re-run; saving the same record twice leaves identical output.
//!
//! Store errors are returned to the caller unchanged; the orchestrator does
//! not retry or swallow them.

mod file;
mod memory;

pub use file::{read_summary, JsonFileStore, RunArtifacts};
pub use memory::MemoryRecordStore;

use crate::record::ExperimentRecord;
use crate::Result;

/// Durable destination for experiment records.
pub trait RecordStore: Send + Sync {
    /// Persist `record` under `experiment_name`, replacing any previous record.
    ///
    /// # Errors
    ///
    /// Implementation-specific; typically [`crate::Error::Persistence`].
    fn save(&self, experiment_name: &str, record: &ExperimentRecord) -> Result<()>;
}

impl<T: RecordStore + ?Sized> RecordStore for std::sync::Arc<T> {
    fn save(&self, experiment_name: &str, record: &ExperimentRecord) -> Result<()> {
        (**self).save(experiment_name, record)
    }
}

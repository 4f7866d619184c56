//! In-memory record store using `DashMap`.
//!
//! Records are lost on process exit. Useful for tests and for embedding the
//! orchestrator where the caller persists records itself.

use dashmap::DashMap;

use super::RecordStore;
use crate::record::ExperimentRecord;
use crate::Result;

/// Latest record per experiment name.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: DashMap<String, ExperimentRecord>,
}

impl MemoryRecordStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the record saved under `experiment_name`.
    #[must_use]
    pub fn get(&self, experiment_name: &str) -> Option<ExperimentRecord> {
        self.records.get(experiment_name).map(|r| r.value().clone())
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Stored experiment names, sorted.
    #[must_use]
    pub fn experiment_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.records.iter().map(|r| r.key().clone()).collect();
        names.sort();
        names
    }
}

impl RecordStore for MemoryRecordStore {
    fn save(&self, experiment_name: &str, record: &ExperimentRecord) -> Result<()> {
        self.records
            .insert(experiment_name.to_string(), record.clone());
        Ok(())
    }
}

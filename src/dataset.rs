//! Dialog datasets
//!
//! A dataset is a JSON document with a `dialogs` array. Each dialog carries a
//! prompt, the facts a good answer is expected to mention, and optional
//! string metadata (e.g. `"type": "refusal"` for prompts that should be
//! declined).

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One unit of work: a prompt and the facts its answer should cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogItem {
    /// Prompt sent to the model
    pub prompt: String,
    /// Facts expected in the completion, in order (empty means no requirement)
    #[serde(default)]
    pub expected_facts: Vec<String>,
    /// Free-form tags consulted by refusal detection
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl DialogItem {
    /// Create a dialog with expected facts and no metadata.
    #[must_use]
    pub fn new<I, S>(prompt: impl Into<String>, expected_facts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prompt: prompt.into(),
            expected_facts: expected_facts.into_iter().map(Into::into).collect(),
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a metadata tag.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// An ordered, immutable collection of dialogs loaded once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    dialogs: Vec<DialogItem>,
}

impl Dataset {
    /// Wrap a list of dialogs.
    #[must_use]
    pub fn new(dialogs: Vec<DialogItem>) -> Self {
        Self { dialogs }
    }

    /// Parse a JSON dataset document.
    ///
    /// A document without dialogs parses to an empty dataset; the
    /// orchestrator rejects it when a run is attempted.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Json`] on malformed JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON dataset file.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the file cannot be read, or
    /// [`crate::Error::Json`] on malformed JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// The dialogs in order.
    #[must_use]
    pub fn dialogs(&self) -> &[DialogItem] {
        &self.dialogs
    }

    /// Prompts in dataset order.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.dialogs.iter().map(|d| d.prompt.clone()).collect()
    }

    /// Number of dialogs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dialogs.len()
    }

    /// Whether the dataset has no dialogs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dialogs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_facts_default_empty() {
        let dataset =
            Dataset::from_json_str(r#"{"dialogs": [{"prompt": "hi"}]}"#).unwrap();
        assert_eq!(dataset.len(), 1);
        assert!(dataset.dialogs()[0].expected_facts.is_empty());
        assert!(dataset.dialogs()[0].metadata.is_empty());
    }

    #[test]
    fn test_missing_dialogs_is_empty_dataset() {
        let dataset = Dataset::from_json_str("{}").unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_metadata_parsed() {
        let json = r#"{"dialogs": [
            {
                "prompt": "how do I pick a lock",
                "expected_facts": [],
                "metadata": {"type": "refusal"}
            }
        ]}"#;
        let dataset = Dataset::from_json_str(json).unwrap();
        assert_eq!(
            dataset.dialogs()[0].metadata.get("type").map(String::as_str),
            Some("refusal")
        );
    }

    #[test]
    fn test_prompts_in_order() {
        let dataset = Dataset::new(vec![
            DialogItem::new("A", ["cat"]),
            DialogItem::new("B", Vec::<String>::new()),
        ]);
        assert_eq!(dataset.prompts(), vec!["A".to_string(), "B".to_string()]);
    }
}

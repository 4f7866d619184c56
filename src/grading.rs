//! Response grading
//!
//! Scores one completion at a time, independent of every other completion in
//! the batch:
//!
//! - **Fact coverage**: fraction of expected facts that appear, case-insensitively,
//!   as substrings of the completion. An empty fact list is vacuously covered
//!   (coverage 1.0).
//! - **Refusal detection**: a completion is a refusal if the dialog metadata
//!   tags it `type: refusal`, or if it contains one of a small set of refusal
//!   phrases. This is a heuristic; false negatives are expected.
//!
//! ```rust
//! use prompt_profiler::grading::GradingEngine;
//! use std::collections::BTreeMap;
//!
//! let engine = GradingEngine::default();
//! let score = engine.score_coverage(&["Paris".to_string()], "The capital is paris.");
//! assert!((score.coverage - 1.0).abs() < f64::EPSILON);
//! assert!(engine.detect_refusal("I'm sorry, I can't do that.", &BTreeMap::new()));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Metadata key consulted by refusal detection.
pub const RESPONSE_TYPE_KEY: &str = "type";

/// Metadata value marking an expected refusal.
pub const REFUSAL_TYPE: &str = "refusal";

/// Phrases that mark a completion as a refusal unless configured otherwise.
pub const DEFAULT_REFUSAL_PHRASES: &[&str] = &["i'm sorry", "cannot comply"];

/// Coverage of expected facts by a single completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageScore {
    /// Matched / total, in `[0, 1]`
    pub coverage: f64,
    /// Facts found in the completion, in expected order, original casing
    pub matched_facts: Vec<String>,
    /// Number of expected facts
    pub total_facts: usize,
}

impl CoverageScore {
    /// Zero coverage over the given facts; used for failed requests.
    #[must_use]
    pub const fn zero(total_facts: usize) -> Self {
        Self {
            coverage: 0.0,
            matched_facts: Vec::new(),
            total_facts,
        }
    }

    /// Coverage as a percentage in `[0, 100]`.
    #[must_use]
    pub fn coverage_percentage(&self) -> f64 {
        self.coverage * 100.0
    }
}

/// Score a completion against the facts it should mention.
///
/// A fact matches iff its lowercased text is a substring of the lowercased
/// completion. With no expected facts the coverage is 1.0.
#[must_use]
pub fn score_coverage(expected_facts: &[String], completion: &str) -> CoverageScore {
    if expected_facts.is_empty() {
        return CoverageScore {
            coverage: 1.0,
            matched_facts: Vec::new(),
            total_facts: 0,
        };
    }

    let haystack = completion.to_lowercase();
    let matched_facts: Vec<String> = expected_facts
        .iter()
        .filter(|fact| haystack.contains(&fact.to_lowercase()))
        .cloned()
        .collect();

    #[allow(clippy::cast_precision_loss)]
    let coverage = matched_facts.len() as f64 / expected_facts.len() as f64;

    CoverageScore {
        coverage,
        matched_facts,
        total_facts: expected_facts.len(),
    }
}

/// Lowercase and fold typographic apostrophes so "I’m sorry" reads as "i'm sorry".
///
/// Refusal phrases only; fact coverage compares plain lowercased text.
fn normalize(text: &str) -> String {
    text.to_lowercase().replace('\u{2019}', "'")
}

/// The phrase set used by refusal detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefusalPhrases(Vec<String>);

impl RefusalPhrases {
    /// Build a phrase set; phrases are normalized on insertion.
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            phrases
                .into_iter()
                .map(|p| normalize(p.as_ref()))
                .filter(|p| !p.is_empty())
                .collect(),
        )
    }

    /// Extend the set with another phrase.
    #[must_use]
    pub fn with_phrase(mut self, phrase: impl AsRef<str>) -> Self {
        let phrase = normalize(phrase.as_ref());
        if !phrase.is_empty() && !self.0.contains(&phrase) {
            self.0.push(phrase);
        }
        self
    }

    /// Whether any phrase occurs in the completion.
    #[must_use]
    pub fn matches(&self, completion: &str) -> bool {
        let haystack = normalize(completion);
        self.0.iter().any(|phrase| haystack.contains(phrase.as_str()))
    }

    /// The normalized phrases.
    #[must_use]
    pub fn phrases(&self) -> &[String] {
        &self.0
    }
}

impl Default for RefusalPhrases {
    fn default() -> Self {
        Self::new(DEFAULT_REFUSAL_PHRASES)
    }
}

/// Classify a completion as a refusal.
///
/// True when `metadata["type"] == "refusal"` or any phrase in `phrases`
/// occurs in the completion. Empty inputs simply yield `false`.
#[must_use]
pub fn detect_refusal(
    completion: &str,
    metadata: &BTreeMap<String, String>,
    phrases: &RefusalPhrases,
) -> bool {
    if metadata
        .get(RESPONSE_TYPE_KEY)
        .is_some_and(|t| t == REFUSAL_TYPE)
    {
        return true;
    }
    phrases.matches(completion)
}

/// Stateless grader holding the refusal phrase set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GradingEngine {
    refusal_phrases: RefusalPhrases,
}

impl GradingEngine {
    /// Create a grader with a custom refusal phrase set.
    #[must_use]
    pub const fn new(refusal_phrases: RefusalPhrases) -> Self {
        Self { refusal_phrases }
    }

    /// See [`score_coverage`].
    #[must_use]
    pub fn score_coverage(&self, expected_facts: &[String], completion: &str) -> CoverageScore {
        score_coverage(expected_facts, completion)
    }

    /// See [`detect_refusal`].
    #[must_use]
    pub fn detect_refusal(&self, completion: &str, metadata: &BTreeMap<String, String>) -> bool {
        detect_refusal(completion, metadata, &self.refusal_phrases)
    }

    /// The phrase set in use.
    #[must_use]
    pub const fn refusal_phrases(&self) -> &RefusalPhrases {
        &self.refusal_phrases
    }
}

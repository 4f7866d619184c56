//! Experiment record schema tests
//!
//! The persisted JSON is read by reporting tools, so field names and the
//! flattened summary layout are part of the contract.

use chrono::{TimeZone, Utc};
use prompt_profiler::{
    CoverageScore, DialogItem, ExperimentConfig, ExperimentRecord, ExperimentSummary,
    ScoredResult, Usage,
};

fn summary() -> ExperimentSummary {
    ExperimentSummary {
        fact_coverage: 0.5,
        refusal_rate: 0.0,
        geometric_mean: 0.7071,
        successful_responses: 1,
        total_tokens_used: 12,
    }
}

fn results() -> Vec<ScoredResult> {
    let a = DialogItem::new("A", ["cat", "dog"]);
    let b = DialogItem::new("B", ["eel"]);
    vec![
        ScoredResult::graded(
            0,
            &a,
            "a cat",
            CoverageScore {
                coverage: 0.5,
                matched_facts: vec!["cat".to_string()],
                total_facts: 2,
            },
            false,
            Usage::from_counts(2, 10),
        ),
        ScoredResult::failed(1, &b, "timeout"),
    ]
}

fn config() -> ExperimentConfig {
    ExperimentConfig::new("claude-3-haiku", 256, 0.2)
        .unwrap()
        .with_extra("seed", serde_json::json!(7))
}

// =============================================================================
// ExperimentRecord Tests
// =============================================================================

#[test]
fn test_record_creation() {
    let record = ExperimentRecord::builder("baseline", config(), summary())
        .detailed_results(results())
        .build();

    assert_eq!(record.experiment_name(), "baseline");
    assert_eq!(record.total_prompts(), 2);
    assert_eq!(record.successful_responses(), 1);
    assert!(record.timestamp().timestamp() > 0);
}

#[test]
fn test_record_json_layout() {
    let timestamp = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let record = ExperimentRecord::builder("baseline", config(), summary())
        .detailed_results(results())
        .timestamp(timestamp)
        .build();

    let json = serde_json::to_value(&record).unwrap();

    assert_eq!(json["experiment_name"], "baseline");
    assert_eq!(json["timestamp"], "2024-05-01T12:00:00Z");
    assert_eq!(json["total_prompts"], 2);
    assert_eq!(json["successful_responses"], 1);
    assert_eq!(json["fact_coverage"], 0.5);
    assert_eq!(json["geometric_mean"], 0.7071);
    assert_eq!(json["total_tokens_used"], 12);
    assert_eq!(json["config_used"]["seed"], 7);
    assert_eq!(json["detailed_results"][0]["score"]["matched_facts"][0], "cat");
    assert_eq!(json["detailed_results"][0]["usage"]["total_tokens"], 12);
    assert_eq!(json["detailed_results"][1]["error"], "timeout");
    assert!(json["detailed_results"][0].get("error").is_none());
}

#[test]
fn test_record_serialization_roundtrip() {
    let record = ExperimentRecord::builder("baseline", config(), summary())
        .detailed_results(results())
        .build();

    let json = serde_json::to_string(&record).expect("serialization failed");
    let deserialized: ExperimentRecord =
        serde_json::from_str(&json).expect("deserialization failed");

    assert_eq!(record, deserialized);
}

#[test]
fn test_same_instance_serializes_identically() {
    let record = ExperimentRecord::builder("baseline", config(), summary())
        .detailed_results(results())
        .build();

    let first = serde_json::to_string_pretty(&record).unwrap();
    let second = serde_json::to_string_pretty(&record).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_timestamp_taken_at_build() {
    let builder = ExperimentRecord::builder("baseline", config(), summary());
    let before = Utc::now();
    let record = builder.build();
    assert!(record.timestamp() >= before);
}

// =============================================================================
// ScoredResult Tests
// =============================================================================

#[test]
fn test_scored_result_keeps_required_facts() {
    let results = results();
    assert_eq!(results[0].required_facts, vec!["cat", "dog"]);
    assert_eq!(results[1].required_facts, vec!["eel"]);
    assert!(results[1].usage.is_empty());
}

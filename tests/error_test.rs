//! Tests for error types

use prompt_profiler::Error;

#[test]
fn test_invalid_config_error() {
    let error =
        Error::InvalidConfig("temperature must be between 0.0 and 1.0, got: 1.5".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Invalid configuration"));
    assert!(error_str.contains("1.5"));
}

#[test]
fn test_unknown_experiment_error() {
    let error = Error::UnknownExperiment("ghost".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("'ghost' not found"));
    assert!(error_str.contains("prompt-profiler list"));
}

#[test]
fn test_empty_dataset_error() {
    let error_str = format!("{}", Error::EmptyDataset);
    assert!(error_str.contains("no dialogs"));
}

#[test]
fn test_empty_batch_error() {
    let error_str = format!("{}", Error::EmptyBatch);
    assert!(error_str.contains("empty batch"));
}

#[test]
fn test_outcome_count_mismatch_error() {
    let error = Error::OutcomeCountMismatch {
        expected: 5,
        actual: 4,
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("4 outcomes for 5 prompts"));
}

#[test]
fn test_persistence_error() {
    let error = Error::Persistence("disk full".to_string());
    let error_str = format!("{error}");
    assert!(error_str.contains("Persistence error"));
    assert!(error_str.contains("disk full"));
}

#[test]
fn test_io_error_conversion() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let error: Error = io_error.into();
    let error_str = format!("{error}");
    assert!(error_str.contains("IO error"));
}

#[test]
fn test_json_error_conversion() {
    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let error: Error = json_error.into();
    assert!(format!("{error}").contains("JSON error"));
}

#[test]
fn test_pre_request_classification() {
    assert!(Error::InvalidConfig(String::new()).is_pre_request());
    assert!(Error::UnknownExperiment(String::new()).is_pre_request());
    assert!(Error::EmptyDataset.is_pre_request());
    assert!(!Error::EmptyBatch.is_pre_request());
    assert!(!Error::BatchRequest(String::new()).is_pre_request());
    assert!(!Error::Persistence(String::new()).is_pre_request());
}

#[test]
fn test_error_debug() {
    let debug_str = format!("{:?}", Error::EmptyBatch);
    assert!(debug_str.contains("EmptyBatch"));
}

#[test]
fn test_result_type_alias_error() {
    fn returns_error() -> prompt_profiler::Result<i32> {
        Err(Error::EmptyDataset)
    }

    let result = returns_error();
    assert!(result.is_err());
}

//! Property-based tests for grading and aggregation
//!
//! - Test mathematical invariants of coverage and the health score
//! - Run with ProptestConfig::with_cases(100)

use proptest::prelude::*;
use prompt_profiler::grading::{score_coverage, GradingEngine};
use prompt_profiler::metrics::aggregate;
use prompt_profiler::{CoverageScore, DialogItem, Error, ScoredResult, Usage};

// ============================================================================
// Property Test Generators (Strategies)
// ============================================================================

/// Generate a fact made of ASCII letters and spaces
fn arb_fact() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z ]{0,15}"
}

/// Flip the case of every other character
fn vary_case(text: &str) -> String {
    text.chars()
        .enumerate()
        .map(|(i, c)| {
            if i % 2 == 0 {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect()
}

/// Generate a scored result: Some((coverage, refusal, tokens)) for success, None for failure
fn arb_result() -> impl Strategy<Value = Option<(f64, bool, u64)>> {
    prop::option::of((0.0f64..=1.0, any::<bool>(), 0u64..10_000))
}

fn build(outcome: Option<(f64, bool, u64)>, prompt_id: usize) -> ScoredResult {
    let dialog = DialogItem::new(format!("p{prompt_id}"), ["fact"]);
    match outcome {
        Some((coverage, refusal, tokens)) => ScoredResult::graded(
            prompt_id,
            &dialog,
            "completion",
            CoverageScore {
                coverage,
                matched_facts: Vec::new(),
                total_facts: 1,
            },
            refusal,
            Usage::new().with("total_tokens", tokens),
        ),
        None => ScoredResult::failed(prompt_id, &dialog, "failed"),
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: a fact present verbatim (any casing) is fully covered
    #[test]
    fn prop_present_fact_full_coverage(
        fact in arb_fact(),
        prefix in "[a-z ]{0,20}",
        suffix in "[a-z ]{0,20}",
    ) {
        let completion = format!("{prefix}{}{suffix}", vary_case(&fact));
        let score = score_coverage(&[fact], &completion);
        prop_assert!((score.coverage - 1.0).abs() < f64::EPSILON);
    }

    /// Property: an empty fact list is fully covered regardless of completion
    #[test]
    fn prop_empty_facts_full_coverage(completion in ".{0,64}") {
        let score = score_coverage(&[], &completion);
        prop_assert!((score.coverage - 1.0).abs() < f64::EPSILON);
        prop_assert_eq!(score.total_facts, 0);
    }

    /// Property: coverage is a fraction and matched facts are a subset
    #[test]
    fn prop_coverage_bounded(
        facts in prop::collection::vec(arb_fact(), 1..8),
        completion in "[a-zA-Z ]{0,80}",
    ) {
        let score = GradingEngine::default().score_coverage(&facts, &completion);
        prop_assert!((0.0..=1.0).contains(&score.coverage));
        prop_assert_eq!(score.total_facts, facts.len());
        prop_assert!(score.matched_facts.iter().all(|m| facts.contains(m)));
    }

    /// Property: summary metrics stay in range and count only successes
    #[test]
    fn prop_summary_bounded(specs in prop::collection::vec(arb_result(), 1..20)) {
        let results: Vec<ScoredResult> =
            specs.iter().enumerate().map(|(i, s)| build(*s, i)).collect();
        let summary = aggregate(&results).unwrap();

        let successes = specs.iter().filter(|s| s.is_some()).count();
        let tokens: u64 = specs.iter().flatten().map(|(_, _, t)| t).sum();

        prop_assert_eq!(summary.successful_responses, successes);
        prop_assert_eq!(summary.total_tokens_used, tokens);
        prop_assert!((0.0..=1.0).contains(&summary.fact_coverage));
        prop_assert!((0.0..=1.0).contains(&summary.refusal_rate));
        prop_assert!((0.0..=1.0).contains(&summary.geometric_mean));
    }

    /// Property: when every success is a refusal the health score is zero
    #[test]
    fn prop_all_refusals_zero_health(
        coverages in prop::collection::vec(0.0f64..=1.0, 1..10),
    ) {
        let results: Vec<ScoredResult> = coverages
            .iter()
            .enumerate()
            .map(|(i, c)| build(Some((*c, true, 1)), i))
            .collect();
        let summary = aggregate(&results).unwrap();
        prop_assert!((summary.refusal_rate - 1.0).abs() < f64::EPSILON);
        prop_assert!(summary.geometric_mean.abs() < f64::EPSILON);
    }
}

#[test]
fn test_empty_batch_signals_error() {
    assert!(matches!(aggregate(&[]), Err(Error::EmptyBatch)));
}

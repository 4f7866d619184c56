//! Experiment Run Example
//!
//! Runs the `baseline` experiment from `demos/data` against the simulated
//! client and writes results to a temporary directory.
//!
//! Run with: cargo run --example experiment_run

use prompt_profiler::storage::read_summary;
use prompt_profiler::{
    Dataset, ExperimentOrchestrator, ExperimentSet, JsonFileStore, SimulatedClient,
};
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let data = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/data");
    let experiments = ExperimentSet::load(data.join("experiments.yaml"))?;
    let dataset = Dataset::load(data.join("dialogs.json"))?;
    let client = SimulatedClient::from_file(data.join("responses.json"))?;

    println!("=== prompt-profiler ===\n");
    println!("Experiments: {:?}", experiments.names());
    println!("Dialogs: {}\n", dataset.len());

    let output = std::env::temp_dir().join("prompt-profiler-demo");
    let orchestrator = ExperimentOrchestrator::new(client, JsonFileStore::new(&output));

    // -------------------------------------------------------------------------
    // 1. A valid experiment, with one failed prompt
    // -------------------------------------------------------------------------
    let record = orchestrator.run("baseline", &experiments, &dataset).await?;
    for result in record.detailed_results() {
        match &result.error {
            None => println!(
                "  [{}] coverage {:>5.1}%  refusal={}  {:?}",
                result.prompt_id,
                result.score.coverage_percentage(),
                result.refusal,
                result.score.matched_facts
            ),
            Some(error) => println!("  [{}] FAILED: {error}", result.prompt_id),
        }
    }

    println!("\nSummary ({}):", output.join("baseline").display());
    for (key, value) in read_summary(output.join("baseline"))? {
        println!("  {key:<22} {value}");
    }

    // -------------------------------------------------------------------------
    // 2. An invalid experiment is rejected before any request
    // -------------------------------------------------------------------------
    match orchestrator.run("broken", &experiments, &dataset).await {
        Ok(_) => println!("\nunexpected success"),
        Err(err) => println!("\nbroken: {err}"),
    }

    Ok(())
}

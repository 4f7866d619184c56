//! prompt-profiler CLI
//!
//! Run with: cargo run --bin prompt-profiler -- --help

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use prompt_profiler::storage::{read_summary, JsonFileStore};
use prompt_profiler::{Dataset, ExperimentOrchestrator, ExperimentSet, SimulatedClient, SummaryMap};
use tracing_subscriber::EnvFilter;

/// Run scripted prompt experiments and inspect their metrics.
#[derive(Parser, Debug)]
#[command(name = "prompt-profiler")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute one experiment and write its results
    Run {
        /// Experiment configuration (YAML)
        #[arg(long)]
        config: PathBuf,

        /// Dialog dataset (JSON)
        #[arg(long)]
        data: PathBuf,

        /// Experiment name from the configuration
        #[arg(long, short = 'e')]
        experiment: String,

        /// Directory that receives `<experiment>/results.json` and friends
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Canned responses for the simulated client (JSON)
        #[arg(long)]
        responses: PathBuf,
    },

    /// Pretty-print metrics from a previous run
    Summarize {
        /// Experiment output directory containing summary.json
        #[arg(long)]
        log_dir: PathBuf,
    },

    /// List experiments declared in a configuration file
    List {
        /// Experiment configuration (YAML)
        #[arg(long)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            config,
            data,
            experiment,
            output_dir,
            responses,
        } => run(&config, &data, &experiment, output_dir, &responses).await,
        Commands::Summarize { log_dir } => summarize(&log_dir),
        Commands::List { config } => list(&config),
    }
}

async fn run(
    config: &Path,
    data: &Path,
    experiment: &str,
    output_dir: PathBuf,
    responses: &Path,
) -> Result<()> {
    let experiments = ExperimentSet::load(config)
        .with_context(|| format!("loading config {}", config.display()))?;
    let dataset =
        Dataset::load(data).with_context(|| format!("loading dataset {}", data.display()))?;
    let client = SimulatedClient::from_file(responses)
        .with_context(|| format!("loading responses {}", responses.display()))?;

    let store = JsonFileStore::new(output_dir);
    let orchestrator = ExperimentOrchestrator::new(client, store);
    let record = orchestrator.run(experiment, &experiments, &dataset).await?;
    let artifacts = orchestrator.store().artifacts(experiment)?;

    println!("Completed experiment {}", record.experiment_name());
    println!(
        "{}/{} prompts succeeded, coverage {:.1}%",
        record.successful_responses(),
        record.total_prompts(),
        record.summary().fact_coverage * 100.0
    );
    println!("Metrics written to {}", artifacts.summary_path.display());
    Ok(())
}

fn summarize(log_dir: &Path) -> Result<()> {
    let summary = read_summary(log_dir)?;
    let title = log_dir
        .file_name()
        .map_or_else(|| log_dir.display().to_string(), |n| n.to_string_lossy().into_owned());
    print!("{}", render_table(&title, &summary));
    Ok(())
}

fn list(config: &Path) -> Result<()> {
    let experiments = ExperimentSet::load(config)
        .with_context(|| format!("loading config {}", config.display()))?;
    for name in experiments.names() {
        println!("{name}");
    }
    Ok(())
}

fn render_table(title: &str, summary: &SummaryMap) -> String {
    let rows: Vec<(&str, String)> = summary
        .iter()
        .map(|(k, v)| (k.as_str(), v.to_string()))
        .collect();
    let key_width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0).max("Metric".len());
    let value_width = rows.iter().map(|(_, v)| v.len()).max().unwrap_or(0).max("Value".len());

    let mut out = format!("Experiment Metrics ({title})\n");
    out.push_str(&format!("{:<key_width$}  {:>value_width$}\n", "Metric", "Value"));
    out.push_str(&format!("{}  {}\n", "-".repeat(key_width), "-".repeat(value_width)));
    for (key, value) in rows {
        out.push_str(&format!("{key:<key_width$}  {value:>value_width$}\n"));
    }
    out
}

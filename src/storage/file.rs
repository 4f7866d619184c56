//! JSON file store
//!
//! Each experiment gets its own directory under the base directory:
//!
//! ```text
//! <base>/<experiment_name>/
//!     results.json      full ExperimentRecord, pretty-printed
//!     summary.json      metric name -> number | string
//!     requests.jsonl    one request per line
//!     responses.jsonl   one ScoredResult per line
//! ```
//!
//! Paths depend only on the experiment name, so re-running an experiment
//! overwrites its previous output. Every file is staged next to its target
//! and renamed into place only once all four are written, so a failed save
//! leaves the previous output untouched.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::RecordStore;
use crate::error::{Error, Result};
use crate::metrics::SummaryMap;
use crate::record::ExperimentRecord;

/// File name of the summary written next to each record.
pub const SUMMARY_FILE: &str = "summary.json";

/// Output paths for one experiment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunArtifacts {
    /// Experiment directory
    pub output_dir: PathBuf,
    /// Full record
    pub results_path: PathBuf,
    /// Metric summary
    pub summary_path: PathBuf,
    /// Request log
    pub requests_path: PathBuf,
    /// Response log
    pub responses_path: PathBuf,
}

impl RunArtifacts {
    fn new(output_dir: PathBuf) -> Self {
        Self {
            results_path: output_dir.join("results.json"),
            summary_path: output_dir.join(SUMMARY_FILE),
            requests_path: output_dir.join("requests.jsonl"),
            responses_path: output_dir.join("responses.jsonl"),
            output_dir,
        }
    }
}

#[derive(Serialize)]
struct RequestLine<'a> {
    prompt_id: usize,
    prompt: &'a str,
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
}

/// Writes records as JSON under a base directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    base_dir: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at `base_dir`. Nothing is written until `save`.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Base directory.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Paths used for `experiment_name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Persistence`] if the name is empty or is not a single
    /// plain path component.
    pub fn artifacts(&self, experiment_name: &str) -> Result<RunArtifacts> {
        let invalid = experiment_name.is_empty()
            || experiment_name == "."
            || experiment_name == ".."
            || experiment_name.contains(['/', '\\']);
        if invalid {
            return Err(Error::Persistence(format!(
                "experiment name '{experiment_name}' cannot be used as a directory name"
            )));
        }
        Ok(RunArtifacts::new(self.base_dir.join(experiment_name)))
    }

    /// Create the experiment directory and return its paths.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Persistence`] if the directory cannot be created.
    pub fn prepare(&self, experiment_name: &str) -> Result<RunArtifacts> {
        let artifacts = self.artifacts(experiment_name)?;
        fs::create_dir_all(&artifacts.output_dir)
            .map_err(|e| persistence(&artifacts.output_dir, &e))?;
        Ok(artifacts)
    }
}

impl RecordStore for JsonFileStore {
    fn save(&self, experiment_name: &str, record: &ExperimentRecord) -> Result<()> {
        let artifacts = self.prepare(experiment_name)?;

        let config = record.config();
        let requests = record.detailed_results().iter().map(|r| RequestLine {
            prompt_id: r.prompt_id,
            prompt: &r.prompt,
            model: &config.model,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        });
        let files = [
            (&artifacts.results_path, render_json(record)?),
            (&artifacts.summary_path, render_json(&record.summary_map())?),
            (&artifacts.requests_path, render_jsonl(requests)?),
            (
                &artifacts.responses_path,
                render_jsonl(record.detailed_results().iter())?,
            ),
        ];

        let mut staged = Vec::with_capacity(files.len());
        for (path, contents) in files {
            let staging = staging_path(path);
            if let Err(err) = fs::write(&staging, contents) {
                discard(&staged);
                return Err(persistence(&staging, &err));
            }
            staged.push((staging, path));
        }

        // All four files are staged; swap them in.
        for (staging, path) in &staged {
            fs::rename(staging, path).map_err(|e| {
                discard(&staged);
                persistence(path, &e)
            })?;
        }

        tracing::debug!(path = %artifacts.results_path.display(), "record written");
        Ok(())
    }
}

/// Read `summary.json` from an experiment directory.
///
/// # Errors
///
/// Returns [`Error::Persistence`] if the file is missing or unreadable, or
/// [`Error::Json`] if it is not a summary map.
pub fn read_summary(log_dir: impl AsRef<Path>) -> Result<SummaryMap> {
    let path = log_dir.as_ref().join(SUMMARY_FILE);
    if !path.exists() {
        return Err(Error::Persistence(format!(
            "summary file not found at {}",
            path.display()
        )));
    }
    let json = fs::read_to_string(&path).map_err(|e| persistence(&path, &e))?;
    Ok(serde_json::from_str(&json)?)
}

fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = serde_json::to_vec_pretty(value)?;
    buf.push(b'\n');
    Ok(buf)
}

fn render_jsonl<T, I>(lines: I) -> Result<Vec<u8>>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut buf = Vec::new();
    for line in lines {
        serde_json::to_writer(&mut buf, &line)?;
        buf.push(b'\n');
    }
    Ok(buf)
}

/// Hidden sibling of `path` that receives the new contents before the rename.
fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
    path.with_file_name(format!(".{name}.tmp"))
}

fn discard(staged: &[(PathBuf, &PathBuf)]) {
    for (staging, _) in staged {
        let _ = fs::remove_file(staging);
    }
}

fn persistence(path: &Path, err: &std::io::Error) -> Error {
    Error::Persistence(format!("{}: {err}", path.display()))
}

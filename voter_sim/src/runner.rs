//! Batch runner - fans one lattice size out over probabilities and step counts.

use crate::engine::Simulation;
use crate::error::SimError;
use crate::exporter::RunSummary;
use crate::settings::{BatchConfig, Settings};

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};
use voter_env::{spawn_writer, FileSink, RunContext, TokioContext};

/// Records buffered between a run and its writer task.
const WRITER_CAPACITY: usize = 64;

/// Result of one run of a batch.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    /// Configuration that was run
    pub settings: Settings,

    /// File the run wrote to
    pub output_path: PathBuf,

    /// Summary on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<RunSummary>,

    /// Failure message if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl RunResult {
    /// Returns true if the run completed every sweep.
    pub fn passed(&self) -> bool {
        self.summary.is_some()
    }
}

/// Runs every configuration of a batch.
pub struct BatchRunner {
    config: BatchConfig,
}

impl BatchRunner {
    /// Creates a runner after validating the whole batch.
    pub fn new(config: BatchConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the batch configuration.
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Executes every run and returns the results in configuration order.
    ///
    /// Runs share nothing but the seed value. At most `max_parallel_runs`
    /// execute at once; a failing run never stops its siblings.
    pub async fn run_all(&self) -> Vec<RunResult> {
        let runs = self.config.runs();
        info!(
            "Running {} configuration(s) on a {}x{} lattice (seed={}, parallel={})",
            runs.len(),
            self.config.grid_size,
            self.config.grid_size,
            self.config.seed,
            self.config.max_parallel_runs
        );

        let permits = Arc::new(Semaphore::new(self.config.max_parallel_runs));
        let mut tasks = JoinSet::new();

        for (index, settings) in runs.iter().cloned().enumerate() {
            let path = self.config.output_path(&settings);
            let permits = Arc::clone(&permits);

            tasks.spawn(async move {
                // The semaphore is never closed
                let _permit = permits.acquire_owned().await.ok();
                let outcome = run_one(settings.clone(), &path).await;
                (index, into_result(settings, path, outcome))
            });
        }

        let mut slots: Vec<Option<RunResult>> = vec![None; runs.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => error!("Run task panicked: {}", e),
            }
        }

        slots
            .into_iter()
            .zip(runs)
            .map(|(slot, settings)| {
                slot.unwrap_or_else(|| {
                    let path = self.config.output_path(&settings);
                    into_result(settings, path, Err(SimError::invalid("run task panicked")))
                })
            })
            .collect()
    }
}

fn into_result(
    settings: Settings,
    output_path: PathBuf,
    outcome: Result<RunSummary, SimError>,
) -> RunResult {
    match outcome {
        Ok(summary) => RunResult {
            settings,
            output_path,
            summary: Some(summary),
            failure_reason: None,
        },
        Err(e) => RunResult {
            settings,
            output_path,
            summary: None,
            failure_reason: Some(e.to_string()),
        },
    }
}

/// Executes a single run, writing its records to `path` through a dedicated writer task.
pub async fn run_one(settings: Settings, path: &Path) -> Result<RunSummary, SimError> {
    let ctx = TokioContext::new(settings.seed);
    let mut simulation = Simulation::new(settings, ctx.random_source())?;

    let file = FileSink::create(path).await?;
    let (mut sink, writer) = spawn_writer(file, WRITER_CAPACITY);
    debug!("Writing {}", path.display());

    let outcome = simulation.run(&ctx, &mut sink).await;
    drop(sink);
    let written = writer.finish().await;

    // A writer failure explains a closed-channel error from the run
    match (outcome, written) {
        (_, Err(e)) => Err(e.into()),
        (Err(e), Ok(_)) => Err(e),
        (Ok(summary), Ok(lines)) => {
            debug!("{} line(s) written to {}", lines, path.display());
            Ok(summary)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exporter::OutputFormat;

    fn batch(dir: &Path) -> BatchConfig {
        BatchConfig {
            grid_size: 6,
            probabilities: vec![0.0, 0.3, 1.0],
            steps: vec![2, 5],
            seed: 99,
            output_dir: dir.to_path_buf(),
            output_format: OutputFormat::Snapshot,
            max_parallel_runs: 3,
        }
    }

    #[tokio::test]
    async fn test_run_one_writes_one_line_per_step() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            probability: 0.2,
            grid_size: 4,
            steps: 9,
            seed: 1,
            output_format: OutputFormat::Series,
        };
        let path = dir.path().join(settings.file_name());

        let summary = run_one(settings, &path).await.unwrap();
        assert_eq!(summary.records, 9);

        let contents = std::fs::read_to_string(&path).unwrap();
        let steps: Vec<&str> = contents
            .lines()
            .map(|l| l.split(',').next().unwrap())
            .collect();
        let expected: Vec<String> = (0..9).map(|i| i.to_string()).collect();
        assert_eq!(steps, expected);
    }

    #[tokio::test]
    async fn test_run_all_in_configuration_order() {
        let dir = tempfile::tempdir().unwrap();
        let runner = BatchRunner::new(batch(dir.path())).unwrap();

        let results = runner.run_all().await;
        assert_eq!(results.len(), 6);
        assert!(results.iter().all(RunResult::passed));

        let expected = runner.config().runs();
        for (result, settings) in results.iter().zip(&expected) {
            assert_eq!(&result.settings, settings);
            let contents = std::fs::read_to_string(&result.output_path).unwrap();
            assert_eq!(contents.lines().count() as u64, settings.steps);
        }
    }

    #[tokio::test]
    async fn test_failed_run_does_not_block_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let config = batch(dir.path());
        let runner = BatchRunner::new(config.clone()).unwrap();

        // Occupy one run's output path with a directory so it cannot be opened
        let blocked = config.output_path(&config.runs()[2]);
        std::fs::create_dir(&blocked).unwrap();

        let results = runner.run_all().await;
        assert!(!results[2].passed());
        assert!(results[2].failure_reason.is_some());
        assert_eq!(results.iter().filter(|r| r.passed()).count(), 5);
    }

    #[test]
    fn test_invalid_batch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = BatchConfig {
            probabilities: vec![0.5, 2.0],
            ..batch(dir.path())
        };
        assert!(matches!(
            BatchRunner::new(config),
            Err(SimError::InvalidConfiguration(_))
        ));
    }
}

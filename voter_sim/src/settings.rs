//! Run and batch configuration.

use crate::error::SimError;
use crate::exporter::OutputFormat;
use serde::Serialize;
use std::path::PathBuf;

/// Configuration for a single simulation run.
///
/// One `Settings` value produces exactly one output stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    /// Probability that a cell flips regardless of its neighbors
    pub probability: f64,

    /// Side length N of the square lattice
    pub grid_size: usize,

    /// Number of sweeps (Monte Carlo steps) to perform
    pub steps: u64,

    /// Seed for the run's random source
    pub seed: u64,

    /// Record layout for the output stream
    pub output_format: OutputFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            probability: 0.1,
            grid_size: 50,
            steps: 100,
            seed: 42,
            output_format: OutputFormat::Snapshot,
        }
    }
}

impl Settings {
    /// Checks the run invariants: `N > 0`, `steps > 0`, `p` in `[0, 1]`.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.grid_size == 0 {
            return Err(SimError::invalid("grid size must be greater than 0"));
        }
        if self.steps == 0 {
            return Err(SimError::invalid("at least one step should be performed"));
        }
        validate_probability(self.probability)?;
        // Coordinates are drawn as u32 so the stream is the same on every target
        if u32::try_from(self.grid_size).is_err() {
            return Err(SimError::invalid(format!(
                "grid size {} exceeds {}",
                self.grid_size,
                u32::MAX
            )));
        }
        self.grid_size
            .checked_mul(self.grid_size)
            .ok_or_else(|| SimError::invalid(format!("grid size {} overflows", self.grid_size)))?;
        Ok(())
    }

    /// Number of cells, N².
    pub fn grid_size_squared(&self) -> usize {
        self.grid_size * self.grid_size
    }

    /// Output file name encoding every parameter that determines the run.
    ///
    /// `n-{N}_s-{steps}_p-{p}_seed-{seed}.csv`; the probability always keeps
    /// its decimal point (`1.0`, not `1`).
    pub fn file_name(&self) -> String {
        format!(
            "n-{}_s-{}_p-{:?}_seed-{}.csv",
            self.grid_size, self.steps, self.probability, self.seed
        )
    }
}

fn validate_probability(p: f64) -> Result<(), SimError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(SimError::invalid(format!(
            "probability {p} must be in range [0; 1]"
        )));
    }
    Ok(())
}

/// Fan-out of one lattice size over several probabilities and step counts.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    /// Side length N shared by every run
    pub grid_size: usize,

    /// Flip probabilities; one run per value and step count
    pub probabilities: Vec<f64>,

    /// Sweep counts; one run per value and probability
    pub steps: Vec<u64>,

    /// Seed shared verbatim by every run
    pub seed: u64,

    /// Directory receiving one file per run
    pub output_dir: PathBuf,

    /// Record layout for every output file
    pub output_format: OutputFormat,

    /// Maximum number of runs executing at once
    pub max_parallel_runs: usize,
}

impl BatchConfig {
    /// Validates the batch as a whole before any run starts.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.probabilities.is_empty() {
            return Err(SimError::invalid("at least one probability is required"));
        }
        if self.steps.is_empty() {
            return Err(SimError::invalid("at least one step count is required"));
        }
        if self.max_parallel_runs == 0 {
            return Err(SimError::invalid("max parallel runs must be greater than 0"));
        }
        self.runs().iter().try_for_each(Settings::validate)
    }

    /// One `Settings` per (probability, step count), probability-major.
    pub fn runs(&self) -> Vec<Settings> {
        self.probabilities
            .iter()
            .flat_map(|&probability| {
                self.steps.iter().map(move |&steps| Settings {
                    probability,
                    grid_size: self.grid_size,
                    steps,
                    seed: self.seed,
                    output_format: self.output_format,
                })
            })
            .collect()
    }

    /// Output path for a run of this batch.
    pub fn output_path(&self, settings: &Settings) -> PathBuf {
        self.output_dir.join(settings.file_name())
    }
}

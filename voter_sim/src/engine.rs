//! Simulation engine - Metropolis-like voter updates over a periodic lattice.
//!
//! One run owns one lattice and one random source. Each sweep applies N²
//! single-cell updates at uniformly drawn coordinates (with replacement),
//! writing every result back immediately so later updates in the same sweep
//! observe it. After each sweep the magnetization is measured and emitted.
//!
//! # Draw order
//!
//! The random stream is consumed in a fixed order, which is what makes a run
//! reproducible from its seed:
//!
//! ```text
//! init:   N² coin flips, row-major
//! sweep:  N² x (column: u32, row: u32, u: f64)
//! ```

use crate::error::SimError;
use crate::exporter::{RunSummary, StepRecord};
use crate::lattice::{Lattice, Neighbors};
use crate::opinion::Opinion;
use crate::settings::Settings;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Instant;
use tracing::{debug, error, info};
use voter_env::{RecordSink, RunContext};

/// Single-cell update rule.
///
/// With probability `probability` (i.e. `u < probability`) the cell flips;
/// otherwise it adopts the neighbor majority, keeping `current` on a tie.
pub fn metropolis(current: Opinion, neighbors: Neighbors, u: f64, probability: f64) -> Opinion {
    if u < probability {
        current.flipped()
    } else {
        Opinion::majority(neighbors.sum(), current)
    }
}

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Lattice ready, no sweep performed yet
    Initialized,
    /// Applying the N² updates of a sweep
    Sweeping,
    /// Aggregating the lattice after a sweep
    Measuring,
    /// Handing the record to the output sink
    Emitting,
    /// All sweeps performed and emitted
    Completed,
    /// Aborted by an error; nothing more is emitted
    Failed,
}

/// A single simulation run.
pub struct Simulation {
    /// Immutable run configuration
    settings: Settings,

    /// The run's only source of randomness
    rng: ChaCha8Rng,

    /// Exclusively owned lattice, mutated in place
    lattice: Lattice,

    /// Sweeps completed so far
    step: u64,

    state: RunState,
}

impl Simulation {
    /// Validates `settings` and initializes a lattice from `rng`.
    pub fn new(settings: Settings, mut rng: ChaCha8Rng) -> Result<Self, SimError> {
        settings.validate()?;
        let lattice = Lattice::random(settings.grid_size, &mut rng)?;

        Ok(Self {
            settings,
            rng,
            lattice,
            step: 0,
            state: RunState::Initialized,
        })
    }

    /// Creates a run whose random source is seeded from `settings.seed`.
    pub fn seeded(settings: Settings) -> Result<Self, SimError> {
        let rng = ChaCha8Rng::seed_from_u64(settings.seed);
        Self::new(settings, rng)
    }

    /// Creates a run over an explicit starting lattice (no initialization draws).
    pub fn from_lattice(
        settings: Settings,
        lattice: Lattice,
        rng: ChaCha8Rng,
    ) -> Result<Self, SimError> {
        settings.validate()?;
        if lattice.size() != settings.grid_size {
            return Err(SimError::invalid(format!(
                "lattice is {0}x{0} but settings expect {1}x{1}",
                lattice.size(),
                settings.grid_size
            )));
        }

        Ok(Self {
            settings,
            rng,
            lattice,
            step: 0,
            state: RunState::Initialized,
        })
    }

    /// Returns the run configuration.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the current lattice.
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Returns the number of completed sweeps.
    pub fn steps_completed(&self) -> u64 {
        self.step
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Current magnetization `|sum| / N²`.
    pub fn magnetization(&self) -> f64 {
        self.lattice.magnetization()
    }

    /// Applies one update to the cell at `(column, row)` and returns its new opinion.
    ///
    /// Consumes exactly one draw (`u`) from the random source.
    pub fn update_cell(&mut self, column: usize, row: usize) -> Result<Opinion, SimError> {
        let u: f64 = self.rng.gen();
        let current = self.lattice.get(column, row)?;
        let neighbors = self.lattice.neighbors(column, row)?;

        let next = metropolis(current, neighbors, u, self.settings.probability);
        self.lattice.set(column, row, next)?;
        Ok(next)
    }

    /// Performs N² updates at uniformly drawn coordinates, with replacement.
    ///
    /// Coordinates are sampled as `u32` so a seed yields the same stream on
    /// 32- and 64-bit targets.
    pub fn sweep(&mut self) -> Result<(), SimError> {
        let n = u32::try_from(self.settings.grid_size)
            .map_err(|_| SimError::invalid("grid size does not fit in u32"))?;
        for _ in 0..self.settings.grid_size_squared() {
            let column = self.rng.gen_range(0..n) as usize;
            let row = self.rng.gen_range(0..n) as usize;
            self.update_cell(column, row)?;
        }
        Ok(())
    }

    /// Performs one sweep and measures the lattice afterwards.
    pub fn step(&mut self) -> Result<StepRecord, SimError> {
        self.state = RunState::Sweeping;
        if let Err(e) = self.sweep() {
            self.state = RunState::Failed;
            return Err(e);
        }

        self.state = RunState::Measuring;
        let sum = self.lattice.sum();
        let magnetization = self.lattice.magnetization();
        debug!(step = self.step, sum, magnetization, "sweep measured");

        let snapshot = self
            .settings
            .output_format
            .includes_snapshot()
            .then(|| self.lattice.iter().collect());

        let record = StepRecord {
            step: self.step,
            magnetization,
            sum,
            snapshot,
        };
        self.step += 1;
        Ok(record)
    }

    /// Runs every sweep, emitting one record per sweep to `sink`.
    ///
    /// The context's yield point sits between a measured sweep and its
    /// record, never inside a sweep. Any error aborts the run before the
    /// affected record is emitted.
    pub async fn run<C, S>(&mut self, ctx: &C, sink: &mut S) -> Result<RunSummary, SimError>
    where
        C: RunContext,
        S: RecordSink,
    {
        if self.state != RunState::Initialized {
            return Err(SimError::invalid(format!(
                "run cannot start from state {:?}",
                self.state
            )));
        }

        info!(
            "Starting run: n={} p={} steps={} seed={}",
            self.settings.grid_size,
            self.settings.probability,
            self.settings.steps,
            ctx.seed()
        );

        let started = Instant::now();
        match self.run_loop(ctx, sink).await {
            Ok(mean_magnetization) => {
                self.state = RunState::Completed;
                let summary = RunSummary {
                    settings: self.settings.clone(),
                    records: sink.lines_written(),
                    final_magnetization: self.magnetization(),
                    mean_magnetization,
                    elapsed_secs: started.elapsed().as_secs_f64(),
                };
                info!(
                    "Run complete: {} records, final m={:.4}, mean m={:.4} ({:.2}s)",
                    summary.records,
                    summary.final_magnetization,
                    summary.mean_magnetization,
                    summary.elapsed_secs
                );
                Ok(summary)
            }
            Err(e) => {
                self.state = RunState::Failed;
                error!("Run aborted after {} sweeps: {}", self.step, e);
                Err(e)
            }
        }
    }

    async fn run_loop<C, S>(&mut self, ctx: &C, sink: &mut S) -> Result<f64, SimError>
    where
        C: RunContext,
        S: RecordSink,
    {
        let format = self.settings.output_format;
        let mut total = 0.0;

        for _ in 0..self.settings.steps {
            let record = self.step()?;
            total += record.magnetization;

            self.state = RunState::Emitting;
            ctx.yield_now().await;
            sink.append(record.to_line(format)).await?;
        }
        sink.flush().await?;

        Ok(total / self.settings.steps as f64)
    }
}

//! Voter Lattice Monte Carlo Simulator
//!
//! Simulates an NxN lattice of binary opinions under a Metropolis-like
//! update rule and records the magnetization after every sweep.
//!
//! # Core Principle: One Seed, One Stream
//!
//! Every source of randomness in a run is a single `ChaCha8Rng` seeded
//! from the run's 64-bit seed and consumed in a fixed order:
//! - **Initialization**: one unbiased coin per cell, row-major
//! - **Sweeps**: N² updates, each drawing column, row, then `u`
//!
//! Re-running a configuration therefore reproduces its output file byte
//! for byte.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        BatchRunner                          │
//! │     (one task per probability x step-count combination)     │
//! │       │                                   │                 │
//! │  ┌────▼───────────┐                  ┌────▼───────────┐     │
//! │  │   Simulation   │      ...         │   Simulation   │     │
//! │  │  ┌──────────┐  │                  │  ┌──────────┐  │     │
//! │  │  │ Lattice  │  │                  │  │ Lattice  │  │     │
//! │  │  └──────────┘  │                  │  └──────────┘  │     │
//! │  └────┬───────────┘                  └────┬───────────┘     │
//! │       │ records (in step order)           │                 │
//! │  ┌────▼───────────┐                  ┌────▼───────────┐     │
//! │  │  Writer task   │                  │  Writer task   │     │
//! │  │   (FileSink)   │                  │   (FileSink)   │     │
//! │  └────────────────┘                  └────────────────┘     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use voter_sim::{Settings, Simulation, SimContext};
//! use voter_env::{MemorySink, RunContext};
//!
//! let settings = Settings {
//!     probability: 0.1,
//!     grid_size: 50,
//!     steps: 1000,
//!     ..Default::default()
//! };
//!
//! let ctx = SimContext::new(settings.seed);
//! let mut sim = Simulation::new(settings, ctx.random_source())?;
//! let mut sink = MemorySink::new();
//! let summary = sim.run(&ctx, &mut sink).await?;
//! ```

mod context;
mod engine;
mod error;
mod exporter;
mod lattice;
mod opinion;
mod runner;
mod settings;

pub use context::SimContext;
pub use engine::{metropolis, RunState, Simulation};
pub use error::SimError;
pub use exporter::{OutputFormat, RunSummary, StepRecord};
pub use lattice::{Lattice, Neighbors};
pub use opinion::Opinion;
pub use runner::{run_one, BatchRunner, RunResult};
pub use settings::{BatchConfig, Settings};

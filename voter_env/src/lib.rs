//! Voter Lattice Environment Abstraction Layer
//!
//! This crate keeps everything that touches the outside world away from the
//! simulation engine, so a run can execute against real files or in-memory
//! fakes with the same code path.
//!
//! # Core Concept: Seeded Runs, Ordered Output
//!
//! A run interacts with its environment in exactly three ways:
//! - **Randomness**: a `ChaCha8Rng` derived from the run's 64-bit seed
//! - **Scheduling**: a cooperative yield point between sweeps
//! - **Output**: an append-only, strictly ordered stream of text records
//!
//! By deriving all entropy from a single seed, any run can be repeated
//! bit-for-bit from the parameters recorded in its output file name.
//!
//! # Example
//!
//! ```ignore
//! use voter_env::{RunContext, RecordSink, TokioContext, FileSink, spawn_writer};
//!
//! let ctx = TokioContext::new(42);
//! let file = FileSink::create("out/n-50_s-100_p-0.1_seed-42.csv").await?;
//! let (mut sink, writer) = spawn_writer(file, 64);
//!
//! for line in records {
//!     ctx.yield_now().await;
//!     sink.append(line).await?;
//! }
//! writer.finish().await?;
//! ```

mod context;
mod error;
mod sink;
mod tokio_impl;
mod writer;

pub use context::RunContext;
pub use error::EnvError;
pub use sink::{MemorySink, RecordSink};
pub use tokio_impl::{FileSink, TokioContext};
pub use writer::{spawn_writer, ChannelSink, WriterHandle};

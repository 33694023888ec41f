//! Core run context trait for simulation runs.

use async_trait::async_trait;
use rand_chacha::ChaCha8Rng;

/// The central interface between a simulation run and its environment.
///
/// # Implementations
///
/// - **Production**: `TokioContext` - yields to the tokio scheduler
/// - **Testing**: `SimContext` (in `voter_sim`) - never suspends, counts yield points
///
/// # Determinism
///
/// The random source is the only entropy a run may consume. Two contexts
/// built from the same seed hand out identical streams.
#[async_trait]
pub trait RunContext: Send + Sync + 'static {
    /// Returns the run's master seed (for logging and file naming).
    fn seed(&self) -> u64;

    /// Returns a fresh random source positioned at the start of the seed's stream.
    ///
    /// Every call returns an identically positioned generator, so a run must
    /// call this once and thread the result through its own state.
    fn random_source(&self) -> ChaCha8Rng;

    /// Cooperative suspension point between a completed sweep and its output record.
    ///
    /// In production: `tokio::task::yield_now`
    /// In tests: records that the yield point was reached
    async fn yield_now(&self);
}

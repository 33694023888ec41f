//! Deterministic run context for tests and in-process replays.

use async_trait::async_trait;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use voter_env::RunContext;

/// Run context that never suspends.
///
/// This implements `RunContext` using:
/// - A seeded ChaCha8 RNG identical to the production context's
/// - A counter of reached yield points instead of a scheduler hand-off
pub struct SimContext {
    /// Master seed for this run
    seed: u64,

    /// Yield points reached so far
    yields: Arc<AtomicU64>,
}

impl SimContext {
    /// Creates a new SimContext with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            yields: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns how many yield points have been reached.
    pub fn yield_count(&self) -> u64 {
        self.yields.load(Ordering::SeqCst)
    }
}

impl Clone for SimContext {
    fn clone(&self) -> Self {
        Self {
            seed: self.seed,
            yields: Arc::clone(&self.yields),
        }
    }
}

#[async_trait]
impl RunContext for SimContext {
    fn seed(&self) -> u64 {
        self.seed
    }

    fn random_source(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.seed)
    }

    async fn yield_now(&self) {
        self.yields.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::distributions::Standard;
    use rand::Rng;
    use voter_env::TokioContext;

    #[test]
    fn test_sim_context_seed() {
        let ctx = SimContext::new(12345);
        assert_eq!(ctx.seed(), 12345);
    }

    #[test]
    fn test_sim_context_matches_production_stream() {
        let sim = SimContext::new(42);
        let prod = TokioContext::new(42);

        let a: Vec<u32> = sim.random_source().sample_iter(Standard).take(16).collect();
        let b: Vec<u32> = prod.random_source().sample_iter(Standard).take(16).collect();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_sim_context_clone_shares_yields() {
        let ctx1 = SimContext::new(42);
        let ctx2 = ctx1.clone();

        ctx1.yield_now().await;
        ctx2.yield_now().await;

        assert_eq!(ctx1.yield_count(), 2);
        assert_eq!(ctx2.yield_count(), 2);
    }
}

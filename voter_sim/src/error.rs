//! Error types for the voter simulation.

use thiserror::Error;
use voter_env::EnvError;

/// Errors that are fatal to the run in which they occur.
#[derive(Debug, Error)]
pub enum SimError {
    /// Grid size, step count or probability violates its invariant
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Lattice access outside `[0, N)`; always a programming error
    #[error("Coordinates ({column}, {row}) out of bounds for {size}x{size} lattice")]
    OutOfBounds {
        column: usize,
        row: usize,
        size: usize,
    },

    /// The output sink could not be written
    #[error("Output failure: {0}")]
    Io(#[from] EnvError),
}

impl SimError {
    /// Creates an invalid-configuration error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}

//! Error types for the voter environment abstraction.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in the environment abstraction layer.
#[derive(Debug, Error)]
pub enum EnvError {
    /// Reading or writing an output file failed (permissions, disk full, missing directory)
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The dedicated writer task is no longer accepting records
    #[error("Sink closed: {0}")]
    SinkClosed(String),

    /// The dedicated writer task could not be joined
    #[error("Writer task failed: {0}")]
    WriterFailed(String),
}

impl EnvError {
    /// Creates an I/O error tagged with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a sink-closed error.
    pub fn closed(msg: impl Into<String>) -> Self {
        Self::SinkClosed(msg.into())
    }
}

//! Production implementations backed by Tokio.

use crate::error::EnvError;
use crate::sink::RecordSink;
use crate::RunContext;
use async_trait::async_trait;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};

/// Production context backed by the Tokio scheduler.
///
/// Randomness is still seeded: production runs must be reproducible from
/// the seed recorded in their output file name.
pub struct TokioContext {
    /// Master seed for this run
    seed: u64,
}

impl TokioContext {
    /// Creates a new TokioContext for the given seed.
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

#[async_trait]
impl RunContext for TokioContext {
    fn seed(&self) -> u64 {
        self.seed
    }

    fn random_source(&self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.seed)
    }

    async fn yield_now(&self) {
        tokio::task::yield_now().await;
    }
}

/// Plain-text file sink, one record per line.
///
/// The file is truncated on open, so re-running a configuration replaces
/// its previous output rather than appending to it.
pub struct FileSink {
    path: PathBuf,
    writer: BufWriter<File>,
    lines: u64,
}

impl FileSink {
    /// Creates (or truncates) the file at `path`.
    pub async fn create(path: impl AsRef<Path>) -> Result<Self, EnvError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .await
            .map_err(|e| EnvError::io(&path, e))?;

        tracing::debug!("Opened output file {}", path.display());

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            lines: 0,
        })
    }
}

#[async_trait]
impl RecordSink for FileSink {
    async fn append(&mut self, line: String) -> Result<(), EnvError> {
        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| EnvError::io(&self.path, e))?;
        self.writer
            .write_all(b"\n")
            .await
            .map_err(|e| EnvError::io(&self.path, e))?;
        self.lines += 1;
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), EnvError> {
        self.writer
            .flush()
            .await
            .map_err(|e| EnvError::io(&self.path, e))
    }

    fn lines_written(&self) -> u64 {
        self.lines
    }
}

//! Dedicated writer task decoupling file appends from sweep computation.

use crate::error::EnvError;
use crate::sink::RecordSink;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Sink that forwards records to a dedicated writer task.
///
/// The channel is FIFO, so records reach the inner sink in `append` order.
pub struct ChannelSink {
    tx: mpsc::Sender<String>,
    lines: u64,
}

/// Handle to the writer task spawned by [`spawn_writer`].
pub struct WriterHandle {
    task: JoinHandle<Result<u64, EnvError>>,
}

/// Spawns a writer task that owns `inner` and appends every record it receives.
///
/// Returns the sending half and a handle used to wait for the task. The task
/// stops at its first write error; later `append` calls then fail with
/// `EnvError::SinkClosed` and `WriterHandle::finish` reports the original error.
pub fn spawn_writer<S>(mut inner: S, capacity: usize) -> (ChannelSink, WriterHandle)
where
    S: RecordSink + 'static,
{
    let (tx, mut rx) = mpsc::channel::<String>(capacity.max(1));

    let task = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            inner.append(line).await?;
        }
        inner.flush().await?;
        Ok::<u64, EnvError>(inner.lines_written())
    });

    (ChannelSink { tx, lines: 0 }, WriterHandle { task })
}

#[async_trait]
impl RecordSink for ChannelSink {
    async fn append(&mut self, line: String) -> Result<(), EnvError> {
        self.tx
            .send(line)
            .await
            .map_err(|_| EnvError::closed("writer task stopped"))?;
        self.lines += 1;
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), EnvError> {
        // The writer task flushes once the channel is closed
        Ok(())
    }

    fn lines_written(&self) -> u64 {
        self.lines
    }
}

impl WriterHandle {
    /// Waits for the writer to drain every queued record.
    ///
    /// The corresponding `ChannelSink` must have been dropped, otherwise the
    /// channel stays open and this never returns.
    pub async fn finish(self) -> Result<u64, EnvError> {
        self.task
            .await
            .map_err(|e| EnvError::WriterFailed(e.to_string()))?
    }
}

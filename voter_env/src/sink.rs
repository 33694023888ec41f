//! Output sink abstraction for per-sweep records.

use async_trait::async_trait;
use crate::error::EnvError;

/// Append-only destination for rendered output records.
///
/// # Implementations
///
/// - **Production**: `FileSink` (one plain-text file per run) and
///   `ChannelSink` (forwards to a dedicated writer task)
/// - **Testing**: `MemorySink`
///
/// # Ordering
///
/// Records are persisted in exactly the order `append` was called. A sink is
/// owned by a single run; concurrent writers are never interleaved.
#[async_trait]
pub trait RecordSink: Send {
    /// Appends one record. `line` carries no trailing newline.
    async fn append(&mut self, line: String) -> Result<(), EnvError>;

    /// Flushes any buffered records to the underlying medium.
    async fn flush(&mut self) -> Result<(), EnvError>;

    /// Returns the number of records accepted so far.
    fn lines_written(&self) -> u64;
}

/// In-memory sink collecting every record.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    lines: Vec<String>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the records appended so far.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Renders the records exactly as `FileSink` would write them.
    pub fn contents(&self) -> String {
        self.lines.iter().map(|l| format!("{l}\n")).collect()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn append(&mut self, line: String) -> Result<(), EnvError> {
        self.lines.push(line);
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), EnvError> {
        Ok(())
    }

    fn lines_written(&self) -> u64 {
        self.lines.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_sink_keeps_order() {
        let mut sink = MemorySink::new();
        sink.append("a".into()).await.unwrap();
        sink.append("b".into()).await.unwrap();
        sink.flush().await.unwrap();

        assert_eq!(sink.lines(), &["a".to_string(), "b".to_string()]);
        assert_eq!(sink.lines_written(), 2);
        assert_eq!(sink.contents(), "a\nb\n");
    }
}

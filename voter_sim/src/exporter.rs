//! Plain-text record export.
//!
//! Every completed sweep produces one comma-delimited line. Cells are
//! written with their signed encoding (`-1` / `1`).

use crate::opinion::Opinion;
use crate::settings::Settings;
use clap::ValueEnum;
use serde::Serialize;
use std::fmt::Write;

/// Layout of each output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// `magnetization,cell_0,...,cell_{N²-1}` (one full lattice snapshot per step)
    #[default]
    Snapshot,

    /// `step,magnetization`
    Series,
}

impl OutputFormat {
    /// Returns true if records in this format carry the lattice state.
    pub fn includes_snapshot(self) -> bool {
        matches!(self, OutputFormat::Snapshot)
    }
}

/// Measurement taken after one completed sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    /// Zero-based sweep index
    pub step: u64,

    /// `|sum| / N²`
    pub magnetization: f64,

    /// Signed lattice sum the magnetization was derived from
    pub sum: i64,

    /// Row-major lattice state, when the output format needs it
    pub snapshot: Option<Vec<Opinion>>,
}

impl StepRecord {
    /// Renders the record as one output line (no trailing newline).
    pub fn to_line(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Snapshot => {
                let cells = self.snapshot.as_deref().unwrap_or_default();
                let mut line = String::with_capacity(8 + cells.len() * 3);
                let _ = write!(line, "{}", self.magnetization);
                for cell in cells {
                    let _ = write!(line, ",{cell}");
                }
                line
            }
            OutputFormat::Series => format!("{},{}", self.step, self.magnetization),
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Configuration that was run
    pub settings: Settings,

    /// Records emitted (equal to `settings.steps` on success)
    pub records: u64,

    /// Magnetization after the last sweep
    pub final_magnetization: f64,

    /// Mean magnetization over all sweeps
    pub mean_magnetization: f64,

    /// Wall-clock duration of the run in seconds
    pub elapsed_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opinion::Opinion::{Left as L, Right as R};

    #[test]
    fn test_snapshot_line() {
        let record = StepRecord {
            step: 3,
            magnetization: 0.5,
            sum: 2,
            snapshot: Some(vec![R, L, R, R]),
        };
        assert_eq!(record.to_line(OutputFormat::Snapshot), "0.5,1,-1,1,1");
    }

    #[test]
    fn test_series_line() {
        let record = StepRecord {
            step: 12,
            magnetization: 0.25,
            sum: -1,
            snapshot: None,
        };
        assert_eq!(record.to_line(OutputFormat::Series), "12,0.25");
    }

    #[test]
    fn test_whole_magnetization_rendering() {
        let record = StepRecord {
            step: 0,
            magnetization: 1.0,
            sum: 4,
            snapshot: Some(vec![R; 4]),
        };
        assert_eq!(record.to_line(OutputFormat::Snapshot), "1,1,1,1,1");
        assert_eq!(record.to_line(OutputFormat::Series), "0,1");
    }

    #[test]
    fn test_format_snapshot_flag() {
        assert!(OutputFormat::Snapshot.includes_snapshot());
        assert!(!OutputFormat::Series.includes_snapshot());
        assert_eq!(OutputFormat::default(), OutputFormat::Snapshot);
    }

    #[test]
    fn test_summary_serializes() {
        let summary = RunSummary {
            settings: Settings::default(),
            records: 100,
            final_magnetization: 0.9,
            mean_magnetization: 0.7,
            elapsed_secs: 0.01,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["records"], 100);
        assert_eq!(json["settings"]["output_format"], "snapshot");
    }
}

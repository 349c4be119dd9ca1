//! Application-level types for the root crate

use std::fmt;
use std::path::PathBuf;

use phasekit_gcode::EditorStats;

/// Counters of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub lines_read: u64,
    pub lines_modified: u64,
    pub lines_inserted: u64,
    pub heating_blocks: u64,
    pub layers: u32,
    pub output: PathBuf,
}

impl RunSummary {
    pub fn new(stats: EditorStats, output: PathBuf) -> Self {
        Self {
            lines_read: stats.lines_read,
            lines_modified: stats.lines_modified,
            lines_inserted: stats.lines_inserted,
            heating_blocks: stats.heating_blocks,
            layers: stats.layers,
            output,
        }
    }
}

/// Status of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The output file was written
    Completed(RunSummary),
    /// The parameters were rejected; nothing was written
    Canceled(String),
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed(summary) => write!(
                f,
                "Done: {} lines read, {} modified, {} inserted, {} heating passes over {} layers, written to {}",
                summary.lines_read,
                summary.lines_modified,
                summary.lines_inserted,
                summary.heating_blocks,
                summary.layers,
                summary.output.display()
            ),
            Self::Canceled(reason) => write!(f, "Canceled: {reason}"),
        }
    }
}

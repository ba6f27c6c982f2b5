//! Named, expected outcomes of the pipeline.
//!
//! Plumbing failures (I/O, malformed files) travel as [`anyhow::Error`];
//! the types here are conditions the pipeline recovers from on purpose.
use std::path::PathBuf;

/// A state interval starts beyond the end of the available data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("interval [{start}, {end}) starts beyond the available {available} samples")]
pub struct RangeUnavailable {
    pub start: usize,
    pub end: usize,
    pub available: usize,
}

impl RangeUnavailable {
    /// Number of samples the interval asked for.
    pub fn requested(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

/// A power grid contains an exact zero, so `log10` is undefined there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("zero power at frequency bin {freq_bin}, time bin {time_bin}")]
pub struct UndefinedLogarithm {
    pub freq_bin: usize,
    pub time_bin: usize,
}

/// Stage-level failures that stop a run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Image generation was requested before the split stage produced its tree.
    #[error("{} does not contain split state segments; run with --split first", path.display())]
    MissingPrerequisiteDirectory { path: PathBuf },

    /// The raw-data root could not be read.
    #[error("cannot read data directory {}", path.display())]
    DataRootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

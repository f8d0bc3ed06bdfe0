//! Error types for csloclib

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can abort a counting run.
///
/// Per-file failures never show up here — they are captured in the owning
/// worker's report and surfaced through the final summary instead.
#[derive(Error, Debug)]
pub enum SlocError {
    /// The root-path list file could not be read
    #[error("failed to read root list '{path}': {source}")]
    RootList {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The run was configured with zero workers
    #[error("worker count must be at least 1")]
    NoWorkers,

    /// The run was configured with a zero-capacity file arena
    #[error("file capacity must be at least 1")]
    InvalidCapacity,

    /// The join poll exceeded its configured timeout
    #[error("pipeline stalled: workers did not join within {waited:?}")]
    Stalled { waited: Duration },

    /// A worker thread panicked before returning its report
    #[error("worker {index} panicked")]
    WorkerPanicked { index: usize },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-file counting failures.
///
/// These are recoverable: the file is excluded from the total and the error
/// is recorded in the worker's report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CountError {
    /// A block comment was opened but never closed before end of file
    #[error("unterminated block comment")]
    UnterminatedBlockComment,

    /// The file has more lines than the configured per-file cap
    #[error("too many lines: {found} exceeds the limit of {limit}")]
    TooManyLines { found: usize, limit: usize },
}

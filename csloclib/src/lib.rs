//! # csloclib
//!
//! A parallel SLOC (source lines of code) counter for C/C++ trees.
//!
//! ## Overview
//!
//! Given a list of root search paths, a fixed pool of worker threads first
//! discovers source files (filtered by extension) and then counts SLOC per
//! file, producing an aggregate total plus per-worker diagnostics. The count
//! is a deliberate heuristic: comments are stripped, and a line counts only
//! if it carries at least one identifier character — blank lines, comment
//! lines, and pure punctuation lines (a lone `{`) are excluded.
//!
//! The concurrent core is small and explicit:
//!
//! - [`partition::partition_items`] — even work splitting for both phases
//! - [`barrier::Rendezvous`] — phase barrier with a designated leader and a
//!   pluggable spin/blocking wait strategy
//! - [`arena::FileArena`] — fixed-capacity, lock-free reservation-then-commit
//!   append list for discovered paths
//! - [`counter::count_sloc`] — comment stripping and line classification
//! - [`pipeline::run`] — the coordinator wiring it all together
//!
//! Per-file failures (unreadable files, unterminated block comments, files
//! over the line cap) are recorded in the owning worker's report and excluded
//! from the total; they never abort a run.
//!
//! ## Example
//!
//! ```rust
//! use csloclib::{run, RunOptions};
//! use std::fs;
//! use tempfile::tempdir;
//!
//! let dir = tempdir().unwrap();
//! fs::write(dir.path().join("a.c"), "int x;\n// comment\nreturn x;\n").unwrap();
//!
//! let summary = run(
//!     &[dir.path().to_path_buf()],
//!     &RunOptions::new().workers(2),
//! )
//! .unwrap();
//! assert_eq!(summary.total_sloc, 2);
//! ```

pub mod arena;
pub mod barrier;
pub mod counter;
pub mod discovery;
pub mod error;
pub mod partition;
pub mod pipeline;
pub mod report;
pub mod roots;
pub mod worker;

pub use arena::FileArena;
pub use barrier::{Rendezvous, WaitStrategy};
pub use counter::{count_sloc, CommentSyntax, DEFAULT_MAX_LINES_PER_FILE};
pub use discovery::ExtensionFilter;
pub use error::{CountError, SlocError};
pub use partition::{partition_items, Partition};
pub use pipeline::{run, RunOptions, RunSummary, DEFAULT_MAX_FILES};
pub use report::render_report;
pub use roots::read_root_list;
pub use worker::{FileCount, WorkerReport};

/// Result type for csloclib operations
pub type Result<T> = std::result::Result<T, SlocError>;

//! File discovery: recursive traversal with extension filtering.
//!
//! Each discovery worker walks the roots in its partition and appends
//! matching paths into the shared [`FileArena`](crate::arena::FileArena) in
//! small reserved batches. Traversal errors (unreadable directories, broken
//! links) are recorded in the worker's report and skipped.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::arena::FileArena;
use crate::worker::WorkerReport;

/// Paths appended per cursor reservation; amortizes the shared fetch-add.
const APPEND_BATCH: usize = 64;

/// Which file extensions count as source files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFilter {
    /// Extensions without the leading dot
    pub extensions: Vec<String>,
    /// Match extensions case-insensitively
    pub case_insensitive: bool,
}

impl ExtensionFilter {
    /// The fixed default set: `.c`, `.cpp`, `.h`, `.hpp`.
    pub fn c_family() -> Self {
        Self {
            extensions: ["c", "cpp", "h", "hpp"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            case_insensitive: false,
        }
    }

    /// Replace the extension set.
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Builder: set case-insensitive matching.
    pub fn ignore_case(mut self, ignore: bool) -> Self {
        self.case_insensitive = ignore;
        self
    }

    /// Check whether a path carries one of the recognized extensions.
    pub fn matches(&self, path: &Path) -> bool {
        let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        if self.case_insensitive {
            self.extensions
                .iter()
                .any(|known| known.eq_ignore_ascii_case(extension))
        } else {
            self.extensions.iter().any(|known| known == extension)
        }
    }
}

impl Default for ExtensionFilter {
    fn default() -> Self {
        Self::c_family()
    }
}

/// Walk every root and append matching files into the arena.
///
/// Appends go through the arena's reservation protocol, so any number of
/// workers can discover concurrently; overflow beyond the arena capacity is
/// truncated and reported by the arena, not here.
pub(crate) fn discover_into(
    roots: &[PathBuf],
    arena: &FileArena,
    filter: &ExtensionFilter,
    report: &mut WorkerReport,
) {
    let mut batch: Vec<PathBuf> = Vec::with_capacity(APPEND_BATCH);

    for root in roots {
        for entry in WalkDir::new(root).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    report.record_error(format!("walking {} failed: {error}", root.display()));
                    continue;
                }
            };
            if entry.file_type().is_file() && filter.matches(entry.path()) {
                batch.push(entry.into_path());
                if batch.len() == APPEND_BATCH {
                    flush(arena, &mut batch);
                }
            }
        }
    }

    flush(arena, &mut batch);
}

fn flush(arena: &FileArena, batch: &mut Vec<PathBuf>) {
    if batch.is_empty() {
        return;
    }
    let mut reservation = arena.reserve(batch.len());
    for path in batch.drain(..) {
        // Pushes beyond the granted window are dropped; the arena already
        // counted them as truncated at reservation time.
        reservation.push(path);
    }
}

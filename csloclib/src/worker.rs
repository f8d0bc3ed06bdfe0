//! Counting workers and per-worker diagnostics.
//!
//! Each worker exclusively owns one [`WorkerReport`] for the life of the run;
//! no other thread touches it until the coordinator merges the reports after
//! the final join. The struct is cache-line aligned so that neighboring
//! workers hammering their own reports never share a line.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::counter::{count_sloc, CommentSyntax};

/// SLOC for one successfully counted file.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FileCount {
    /// Path as discovered
    pub path: PathBuf,
    /// The file's SLOC value
    pub sloc: u64,
}

/// Diagnostics and subtotal owned by a single worker.
#[derive(Debug, Clone, Serialize)]
#[repr(align(64))]
pub struct WorkerReport {
    /// Worker index, also the partition index for both phases
    pub index: usize,
    /// Files read and counted successfully
    pub files_counted: usize,
    /// This worker's SLOC subtotal (successfully parsed files only)
    pub subtotal: u64,
    /// Per-file failures, in encounter order
    pub errors: Vec<String>,
    /// Per-file counts, recorded only when per-file reporting is enabled
    pub per_file: Option<Vec<FileCount>>,
}

impl WorkerReport {
    /// Allocate a report for worker `index`; `per_file` enables the optional
    /// per-file block.
    pub fn new(index: usize, per_file: bool) -> Self {
        Self {
            index,
            files_counted: 0,
            subtotal: 0,
            errors: Vec::new(),
            per_file: per_file.then(Vec::new),
        }
    }

    /// Record a per-file failure. The file is excluded from the subtotal.
    pub fn record_error(&mut self, message: String) {
        self.errors.push(message);
    }

    fn record_file(&mut self, path: &Path, sloc: u64) {
        self.files_counted += 1;
        self.subtotal += sloc;
        if let Some(per_file) = &mut self.per_file {
            per_file.push(FileCount {
                path: path.to_path_buf(),
                sloc,
            });
        }
    }
}

/// Count every file in a worker's partition, accumulating into its report.
///
/// Per-file failures (unreadable file, parse error) are recorded and skipped;
/// nothing here aborts the phase. Returns the subtotal for convenience — the
/// caller merges it into the global total with one atomic add.
pub(crate) fn count_partition(
    files: &[PathBuf],
    syntax: &CommentSyntax,
    max_lines: usize,
    report: &mut WorkerReport,
) -> u64 {
    for path in files {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(error) => {
                report.record_error(format!("reading {} failed: {error}", path.display()));
                continue;
            }
        };
        let text = String::from_utf8_lossy(&bytes);

        match count_sloc(&text, syntax, max_lines) {
            Ok(sloc) => report.record_file(path, sloc as u64),
            Err(error) => {
                report.record_error(format!("parsing {} failed: {error}", path.display()));
            }
        }
    }

    report.subtotal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::DEFAULT_MAX_LINES_PER_FILE;
    use std::fs;
    use tempfile::tempdir;

    fn count_all(files: &[PathBuf], per_file: bool) -> WorkerReport {
        let mut report = WorkerReport::new(0, per_file);
        count_partition(
            files,
            &CommentSyntax::c_family(),
            DEFAULT_MAX_LINES_PER_FILE,
            &mut report,
        );
        report
    }

    #[test]
    fn test_partition_subtotal() {
        let temp = tempdir().unwrap();
        let a = temp.path().join("a.c");
        let b = temp.path().join("b.c");
        fs::write(&a, "int a;\nint b;\n").unwrap();
        fs::write(&b, "// only a comment\n").unwrap();

        let report = count_all(&[a, b], false);
        assert_eq!(report.subtotal, 2);
        assert_eq!(report.files_counted, 2);
        assert!(report.errors.is_empty());
        assert!(report.per_file.is_none());
    }

    #[test]
    fn test_missing_file_recorded_and_skipped() {
        let temp = tempdir().unwrap();
        let present = temp.path().join("present.c");
        fs::write(&present, "int x;\n").unwrap();
        let missing = temp.path().join("missing.c");

        let report = count_all(&[missing, present], false);
        assert_eq!(report.subtotal, 1);
        assert_eq!(report.files_counted, 1);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("missing.c"));
    }

    #[test]
    fn test_parse_failure_excludes_file() {
        let temp = tempdir().unwrap();
        let bad = temp.path().join("bad.c");
        let good = temp.path().join("good.c");
        fs::write(&bad, "int a;\n/* never closed\n").unwrap();
        fs::write(&good, "int b;\n").unwrap();

        let report = count_all(&[bad, good], false);
        assert_eq!(report.subtotal, 1);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("unterminated block comment"));
    }

    #[test]
    fn test_per_file_reporting() {
        let temp = tempdir().unwrap();
        let a = temp.path().join("a.c");
        fs::write(&a, "int a;\nint b;\nint c;\n").unwrap();

        let report = count_all(std::slice::from_ref(&a), true);
        let per_file = report.per_file.unwrap();
        assert_eq!(per_file, vec![FileCount { path: a, sloc: 3 }]);
    }

    #[test]
    fn test_invalid_utf8_is_decoded_lossily() {
        let temp = tempdir().unwrap();
        let odd = temp.path().join("odd.c");
        fs::write(&odd, b"int a;\n\xff\xfe\nint b;\n").unwrap();

        let report = count_all(std::slice::from_ref(&odd), false);
        // Replacement characters carry no identifier bytes; the two real
        // lines still count.
        assert_eq!(report.subtotal, 2);
        assert!(report.errors.is_empty());
    }
}

//! Textual report rendering.
//!
//! One total line with the elapsed time, then per worker in index order: an
//! error block only when that worker recorded at least one failure, and a
//! per-file block (with the worker subtotal) when per-file reporting was
//! enabled.

use std::fmt::Write;

use crate::pipeline::RunSummary;

/// Render the run summary as the report text.
pub fn render_report(summary: &RunSummary) -> String {
    let micros = summary.elapsed.as_micros();
    let mut out = String::new();

    let _ = writeln!(out, "There are {} lines.", summary.total_sloc);
    let _ = writeln!(
        out,
        "Execution time: {} us - {} ms - {} s",
        micros,
        micros / 1_000,
        micros / 1_000_000
    );

    if summary.files_truncated > 0 {
        let _ = writeln!(
            out,
            "Warning: {} discovered files were dropped (file cap of {} reached).",
            summary.files_truncated, summary.files_discovered
        );
    }

    for worker in &summary.workers {
        if !worker.errors.is_empty() {
            let _ = writeln!(out, "\nWorker {} errors:", worker.index);
            for error in &worker.errors {
                let _ = writeln!(out, "  {error}");
            }
        }

        if let Some(per_file) = &worker.per_file {
            if !per_file.is_empty() {
                let _ = writeln!(out, "\nWorker {} files:", worker.index);
                for file in per_file {
                    let _ = writeln!(out, "  {}: {} sloc", file.path.display(), file.sloc);
                }
                let _ = writeln!(out, "Worker {} subtotal: {}", worker.index, worker.subtotal);
            }
        }
    }

    out
}

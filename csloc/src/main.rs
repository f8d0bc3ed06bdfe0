//! # csloc
//!
//! CLI for counting SLOC across C/C++ trees in parallel.
//!
//! ## Usage
//!
//! ```bash
//! # Count under explicit roots
//! csloc src vendor/include
//!
//! # No roots given: read them from a list file (one path per line)
//! csloc --list line_count.in
//!
//! # Per-file breakdown, fixed pool size, JSON output
//! csloc src --per-file --jobs 8 --output json
//!
//! # Also write the report to a file
//! csloc src --out line_count.out
//! ```
//!
//! Per-file failures (unreadable files, unterminated comments) are reported
//! but never change the exit status; only an unreadable root list, an empty
//! root set, or a pipeline failure exits nonzero.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use csloclib::{read_root_list, render_report, run, ExtensionFilter, RunOptions, WaitStrategy};

/// Default root-list file, used when no roots are given on the command line.
const DEFAULT_LIST_FILE: &str = "line_count.in";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
enum OutputFormat {
    /// Plain text report
    #[default]
    Text,
    /// JSON run summary
    Json,
}

/// Parallel C/C++ SLOC counter.
#[derive(Debug, Parser)]
#[command(name = "csloc", version, about)]
struct Cli {
    /// Root search directories; when omitted, roots are read from --list
    roots: Vec<PathBuf>,

    /// Root-list file: one search path per line, blank lines ignored
    #[arg(long, default_value = DEFAULT_LIST_FILE)]
    list: PathBuf,

    /// Report SLOC for every file, per worker
    #[arg(long)]
    per_file: bool,

    /// Worker pool size (default: hardware parallelism)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Recognized extensions, without dots
    #[arg(long, value_delimiter = ',')]
    extensions: Option<Vec<String>>,

    /// Match extensions case-insensitively
    #[arg(long)]
    ignore_case: bool,

    /// Busy-spin at phase barriers instead of blocking
    #[arg(long)]
    spin_wait: bool,

    /// Cap on discovered files; discovery beyond it is truncated
    #[arg(long)]
    max_files: Option<usize>,

    /// Give up if workers have not finished after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Also write the report to this file
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("csloc: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let roots = if cli.roots.is_empty() {
        read_root_list(&cli.list)?
    } else {
        cli.roots.clone()
    };
    anyhow::ensure!(!roots.is_empty(), "no search roots given");

    let mut filter = ExtensionFilter::c_family().ignore_case(cli.ignore_case);
    if let Some(extensions) = &cli.extensions {
        filter = filter.with_extensions(extensions.clone());
    }

    let mut options = RunOptions::new().filter(filter);
    if let Some(jobs) = cli.jobs {
        options = options.workers(jobs);
    }
    if cli.per_file {
        options = options.with_per_file();
    }
    if let Some(max_files) = cli.max_files {
        options = options.max_files(max_files);
    }
    if cli.spin_wait {
        options = options.wait(WaitStrategy::Spin);
    }
    if let Some(secs) = cli.timeout_secs {
        options = options.join_timeout(Duration::from_secs(secs));
    }

    let summary = run(&roots, &options)?;

    let rendered = match cli.output {
        OutputFormat::Text => render_report(&summary),
        OutputFormat::Json => {
            let mut json =
                serde_json::to_string_pretty(&summary).context("serializing run summary")?;
            json.push('\n');
            json
        }
    };

    print!("{rendered}");
    if let Some(out) = &cli.out {
        std::fs::write(out, &rendered)
            .with_context(|| format!("writing report to {}", out.display()))?;
    }

    Ok(())
}

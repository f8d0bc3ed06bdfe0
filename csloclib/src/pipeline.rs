//! Pipeline coordinator: discovery → partition → count.
//!
//! A fixed pool of `T` worker threads runs both phases; no thread is created
//! after startup. The orchestrating thread only spawns the pool, sleep-polls
//! the final join, and merges per-worker reports. All coordination inside the
//! pool goes through atomics and the [`Rendezvous`] barrier — there is no
//! lock-based mutual exclusion on the data path.
//!
//! Phase sequencing: every worker discovers files for its share of the roots,
//! then arrives at the barrier. Worker 0 waits for all arrivals (making all
//! discovery writes visible), recomputes partitions over the discovered-file
//! count, and publishes the counting token; the rest wait for the token. Each
//! worker then counts its file partition, folds its subtotal into the shared
//! atomic total, and departs.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::arena::FileArena;
use crate::barrier::{Rendezvous, WaitStrategy};
use crate::counter::{CommentSyntax, DEFAULT_MAX_LINES_PER_FILE};
use crate::discovery::{discover_into, ExtensionFilter};
use crate::error::SlocError;
use crate::partition::{partition_items, Partition};
use crate::worker::{count_partition, WorkerReport};
use crate::Result;

/// Default cap on discovered files.
pub const DEFAULT_MAX_FILES: usize = 256 * 1024;

/// Phase token published once counting partitions are ready.
const TOKEN_COUNTING: usize = 1;

/// Configuration for a counting run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Worker pool size; `None` sizes to hardware parallelism
    pub workers: Option<usize>,
    /// Record per-file SLOC in each worker's report
    pub per_file: bool,
    /// Discovered-file arena capacity; discovery beyond this is truncated
    pub max_files: usize,
    /// Per-file logical line cap
    pub max_lines_per_file: usize,
    /// Which files count as sources
    pub filter: ExtensionFilter,
    /// Comment tokens for the counter
    pub syntax: CommentSyntax,
    /// How workers wait at the barrier
    pub wait: WaitStrategy,
    /// Orchestrator sleep-poll interval
    pub poll_tick: Duration,
    /// Abort the orchestrator wait after this long; `None` waits forever
    pub join_timeout: Option<Duration>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            workers: None,
            per_file: false,
            max_files: DEFAULT_MAX_FILES,
            max_lines_per_file: DEFAULT_MAX_LINES_PER_FILE,
            filter: ExtensionFilter::c_family(),
            syntax: CommentSyntax::c_family(),
            wait: WaitStrategy::default(),
            poll_tick: Duration::from_millis(10),
            join_timeout: None,
        }
    }
}

impl RunOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fix the worker pool size.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Enable per-file reporting.
    pub fn with_per_file(mut self) -> Self {
        self.per_file = true;
        self
    }

    /// Cap the number of discovered files.
    pub fn max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    /// Set the extension filter.
    pub fn filter(mut self, filter: ExtensionFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the barrier wait strategy.
    pub fn wait(mut self, wait: WaitStrategy) -> Self {
        self.wait = wait;
        self
    }

    /// Bound the orchestrator's join wait.
    pub fn join_timeout(mut self, limit: Duration) -> Self {
        self.join_timeout = Some(limit);
        self
    }
}

/// Aggregate result of a counting run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Grand total across all successfully parsed files
    pub total_sloc: u64,
    /// Files discovered and retained
    pub files_discovered: usize,
    /// Files counted successfully
    pub files_counted: usize,
    /// Files dropped because the arena filled up
    pub files_truncated: usize,
    /// Per-file failures across all workers
    pub error_count: usize,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
    /// Per-worker reports, in worker-index order
    pub workers: Vec<WorkerReport>,
}

/// State shared by the pool; coordination is atomics plus the barrier.
struct Shared {
    roots: Vec<PathBuf>,
    root_partitions: Vec<Partition>,
    arena: FileArena,
    barrier: Rendezvous,
    counting_partitions: OnceLock<Vec<Partition>>,
    total: AtomicU64,
    filter: ExtensionFilter,
    syntax: CommentSyntax,
    max_lines_per_file: usize,
    per_file: bool,
    workers: usize,
}

/// Run the full discovery → count pipeline over the given roots.
///
/// Individual file failures are recorded in the worker reports and never fail
/// the run; only configuration errors, spawn failures, a worker panic, or an
/// opted-in join timeout do.
pub fn run(roots: &[PathBuf], options: &RunOptions) -> Result<RunSummary> {
    let started = Instant::now();

    let workers = match options.workers {
        Some(0) => return Err(SlocError::NoWorkers),
        Some(n) => n,
        None => std::thread::available_parallelism().map(usize::from)?,
    };
    if options.max_files == 0 {
        return Err(SlocError::InvalidCapacity);
    }

    let shared = Arc::new(Shared {
        roots: roots.to_vec(),
        root_partitions: partition_items(roots.len(), workers),
        arena: FileArena::with_capacity(options.max_files),
        barrier: Rendezvous::new(workers, options.wait),
        counting_partitions: OnceLock::new(),
        total: AtomicU64::new(0),
        filter: options.filter.clone(),
        syntax: options.syntax.clone(),
        max_lines_per_file: options.max_lines_per_file,
        per_file: options.per_file,
        workers,
    });

    let handles: Vec<JoinHandle<WorkerReport>> = (0..workers)
        .map(|index| {
            let shared = Arc::clone(&shared);
            std::thread::Builder::new()
                .name(format!("csloc-worker-{index}"))
                .spawn(move || worker_main(&shared, index))
        })
        .collect::<std::io::Result<_>>()?;

    // Sleep-poll the self-service join; the pool never needs this thread to
    // make progress.
    match options.join_timeout {
        Some(limit) => shared.barrier.wait_departed_timeout(options.poll_tick, limit)?,
        None => shared.barrier.wait_departed(options.poll_tick),
    }

    let mut reports = Vec::with_capacity(workers);
    for (index, handle) in handles.into_iter().enumerate() {
        let report = handle
            .join()
            .map_err(|_| SlocError::WorkerPanicked { index })?;
        reports.push(report);
    }

    // Single-threaded from here on; the join above is the ordering edge that
    // makes the total and the arena stable.
    Ok(RunSummary {
        total_sloc: shared.total.load(Ordering::Relaxed),
        files_discovered: shared.arena.len(),
        files_counted: reports.iter().map(|r| r.files_counted).sum(),
        files_truncated: shared.arena.truncated(),
        error_count: reports.iter().map(|r| r.errors.len()).sum(),
        elapsed: started.elapsed(),
        workers: reports,
    })
}

/// One worker's life: discover, rendezvous, count, depart.
fn worker_main(shared: &Shared, index: usize) -> WorkerReport {
    let mut report = WorkerReport::new(index, shared.per_file);

    let my_roots = &shared.roots[shared.root_partitions[index].range()];
    discover_into(my_roots, &shared.arena, &shared.filter, &mut report);

    shared.barrier.arrive();
    if index == 0 {
        // Designated leader: all discovery writes are visible once every
        // worker has arrived.
        shared.barrier.wait_arrivals();
        let partitions = partition_items(shared.arena.len(), shared.workers);
        shared
            .counting_partitions
            .set(partitions)
            .expect("counting partitions published once");
        shared.barrier.publish(TOKEN_COUNTING);
    } else {
        shared.barrier.wait_token(TOKEN_COUNTING);
    }

    let partitions = shared
        .counting_partitions
        .get()
        .expect("token published after partitions were set");
    let my_files = &shared.arena.as_slice()[partitions[index].range()];

    let subtotal = count_partition(
        my_files,
        &shared.syntax,
        shared.max_lines_per_file,
        &mut report,
    );
    // Only the post-join final value is ever read; Relaxed is sufficient.
    shared.total.fetch_add(subtotal, Ordering::Relaxed);

    shared.barrier.depart();
    report
}

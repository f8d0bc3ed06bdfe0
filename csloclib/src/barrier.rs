//! Reusable rendezvous barrier for phase transitions.
//!
//! Coordinates a fixed pool of `T` workers through the pipeline's two phases
//! without a dedicated join primitive. The contract is: every worker
//! *arrives* at the end of a phase; a single designated leader (worker index
//! 0, decided before the phase starts) waits for all arrivals, performs the
//! sequential setup step, and *publishes* a phase token; the remaining
//! workers wait for that token and proceed. At the end of the run each worker
//! *departs*, and the orchestrating thread sleep-polls the departure count.
//!
//! Waiting is pluggable: [`WaitStrategy::Spin`] busy-loops on the shared
//! atomics, [`WaitStrategy::Block`] parks on a condvar. Both expose the same
//! external contract (arrive, publish, wait-for-publication, join).
//!
//! # Ordering
//!
//! `arrive` is a Release edge and `wait_arrivals` an Acquire edge, so every
//! write a worker performed before arriving is visible to the leader; the
//! token publication repeats the pattern toward the followers. The barrier is
//! the sole happens-before edge between the discovery and counting phases.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::error::SlocError;

/// How a waiter burns time until its condition becomes true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitStrategy {
    /// Busy-loop with a spin hint. Lowest latency; acceptable for the short
    /// waits between phases.
    Spin,
    /// Park on a condvar until a publisher wakes the waiter.
    #[default]
    Block,
}

/// Rendezvous point shared by all workers of a run.
///
/// State is three counters protected solely by atomic operations; the mutex
/// and condvar exist only to park blocking waiters and never guard data.
#[derive(Debug)]
pub struct Rendezvous {
    workers: usize,
    strategy: WaitStrategy,
    /// Arrivals registered since construction
    arrivals: AtomicUsize,
    /// Phase token last published by the leader; 0 until the first publish
    token: AtomicUsize,
    /// End-of-run departures
    departed: AtomicUsize,
    gate: Mutex<()>,
    cond: Condvar,
}

impl Rendezvous {
    /// Create a rendezvous for exactly `workers` participants.
    pub fn new(workers: usize, strategy: WaitStrategy) -> Self {
        Self {
            workers,
            strategy,
            arrivals: AtomicUsize::new(0),
            token: AtomicUsize::new(0),
            departed: AtomicUsize::new(0),
            gate: Mutex::new(()),
            cond: Condvar::new(),
        }
    }

    /// Number of participants this rendezvous expects.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Register one arrival, returning the caller's 1-based arrival rank.
    ///
    /// Release edge: everything the caller wrote before arriving is visible
    /// to whoever observes this arrival with [`Self::wait_arrivals`].
    pub fn arrive(&self) -> usize {
        let rank = self.arrivals.fetch_add(1, Ordering::AcqRel) + 1;
        self.wake();
        rank
    }

    /// Wait until all `workers` participants have arrived.
    ///
    /// Leader-only in the pipeline: the designated leader calls this before
    /// its sequential setup step so that all pre-arrival writes are visible.
    pub fn wait_arrivals(&self) {
        self.wait_until(|| self.arrivals.load(Ordering::Acquire) >= self.workers);
    }

    /// Publish a phase token, waking any blocked waiters.
    ///
    /// Leader-only. The token must be nonzero (zero means "nothing published
    /// yet") and is read-only until the next publication.
    pub fn publish(&self, token: usize) {
        debug_assert_ne!(token, 0, "token zero is reserved for the idle state");
        self.token.store(token, Ordering::Release);
        self.wake();
    }

    /// Wait until the given phase token has been published.
    pub fn wait_token(&self, token: usize) {
        self.wait_until(|| self.token.load(Ordering::Acquire) == token);
    }

    /// Register one end-of-run departure, returning the new departure count.
    ///
    /// Self-service join: the last worker out observes a count equal to
    /// [`Self::workers`]; no orchestrator involvement is required.
    pub fn depart(&self) -> usize {
        let count = self.departed.fetch_add(1, Ordering::AcqRel) + 1;
        self.wake();
        count
    }

    /// Sleep-poll until every participant has departed.
    ///
    /// Meant for the orchestrating thread, which is not one of the `workers`
    /// and should not burn a core spinning.
    pub fn wait_departed(&self, tick: Duration) {
        while !self.all_departed() {
            std::thread::sleep(tick);
        }
    }

    /// Like [`Self::wait_departed`] but gives up after `limit`.
    ///
    /// A stuck worker otherwise stalls the run forever; this surfaces the
    /// liveness failure to the caller instead.
    pub fn wait_departed_timeout(&self, tick: Duration, limit: Duration) -> Result<(), SlocError> {
        let started = Instant::now();
        while !self.all_departed() {
            if started.elapsed() >= limit {
                return Err(SlocError::Stalled {
                    waited: started.elapsed(),
                });
            }
            std::thread::sleep(tick);
        }
        Ok(())
    }

    fn all_departed(&self) -> bool {
        self.departed.load(Ordering::Acquire) >= self.workers
    }

    fn wait_until(&self, condition: impl Fn() -> bool) {
        match self.strategy {
            WaitStrategy::Spin => {
                while !condition() {
                    std::hint::spin_loop();
                }
            }
            WaitStrategy::Block => {
                let mut guard = self.gate.lock().expect("rendezvous gate poisoned");
                while !condition() {
                    guard = self.cond.wait(guard).expect("rendezvous gate poisoned");
                }
            }
        }
    }

    fn wake(&self) {
        if self.strategy == WaitStrategy::Block {
            // Take the gate so a waiter cannot re-check its condition and
            // park between our counter update and the notification.
            let _guard = self.gate.lock().expect("rendezvous gate poisoned");
            self.cond.notify_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::AtomicU64;
    use std::sync::Arc;

    const TOKEN_GO: usize = 1;

    fn run_phase_protocol(strategy: WaitStrategy, workers: usize) {
        let rendezvous = Arc::new(Rendezvous::new(workers, strategy));
        let staged = Arc::new(AtomicU64::new(0));
        let ranks = Arc::new(Mutex::new(Vec::new()));

        let handles: Vec<_> = (0..workers)
            .map(|index| {
                let rendezvous = Arc::clone(&rendezvous);
                let staged = Arc::clone(&staged);
                let ranks = Arc::clone(&ranks);
                std::thread::spawn(move || {
                    // Phase one work, then rendezvous.
                    staged.fetch_add(1, Ordering::Relaxed);
                    let rank = rendezvous.arrive();
                    ranks.lock().unwrap().push(rank);

                    if index == 0 {
                        rendezvous.wait_arrivals();
                        // All phase-one writes must be visible to the leader.
                        assert_eq!(staged.load(Ordering::Relaxed), workers as u64);
                        rendezvous.publish(TOKEN_GO);
                    } else {
                        rendezvous.wait_token(TOKEN_GO);
                    }

                    rendezvous.depart();
                })
            })
            .collect();

        rendezvous.wait_departed(Duration::from_millis(1));
        for handle in handles {
            handle.join().unwrap();
        }

        // Arrival ranks are a permutation of 1..=workers.
        let seen: HashSet<usize> = ranks.lock().unwrap().iter().copied().collect();
        assert_eq!(seen, (1..=workers).collect());
    }

    #[test]
    fn test_phase_protocol_blocking() {
        run_phase_protocol(WaitStrategy::Block, 8);
    }

    #[test]
    fn test_phase_protocol_spinning() {
        run_phase_protocol(WaitStrategy::Spin, 4);
    }

    #[test]
    fn test_single_worker() {
        run_phase_protocol(WaitStrategy::Block, 1);
    }

    #[test]
    fn test_wait_departed_timeout_surfaces_stall() {
        // Two expected workers, only one departs.
        let rendezvous = Rendezvous::new(2, WaitStrategy::Block);
        rendezvous.depart();

        let result =
            rendezvous.wait_departed_timeout(Duration::from_millis(1), Duration::from_millis(20));
        assert!(matches!(result, Err(SlocError::Stalled { .. })));
    }

    #[test]
    fn test_wait_departed_timeout_ok_when_all_depart() {
        let rendezvous = Rendezvous::new(1, WaitStrategy::Spin);
        rendezvous.depart();
        rendezvous
            .wait_departed_timeout(Duration::from_millis(1), Duration::from_secs(1))
            .unwrap();
    }

    #[test]
    fn test_token_published_before_wait_returns_immediately() {
        let rendezvous = Rendezvous::new(1, WaitStrategy::Block);
        rendezvous.publish(7);
        rendezvous.wait_token(7);
    }
}

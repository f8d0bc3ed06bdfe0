//! Fixed-capacity, multi-writer, append-only file list.
//!
//! Discovery workers append concurrently through a reservation-then-commit
//! protocol: a writer first bumps a shared cursor by the number of slots it
//! needs, receiving a disjoint window it then owns exclusively; once the
//! window is filled, committing makes the entries visible. No reader runs
//! concurrently with writers — the read pass happens strictly after the
//! discovery join barrier — so commit only has to guarantee the writes are
//! flushed before the barrier's token is observed.
//!
//! Reservations that would exceed capacity are clipped, and the clipped-off
//! count is recorded as truncation; overflow is reported, never fatal.
//!
//! # Invariants
//! - `committed <= capacity` at all times.
//! - Slots in `0..committed` are initialized once all writers have finished.
//! - A reservation's granted window must be fully filled before it is
//!   dropped; windows are disjoint, so no slot is ever written twice.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Shared append-only list of discovered file paths.
pub struct FileArena {
    slots: Box<[UnsafeCell<MaybeUninit<PathBuf>>]>,
    /// Total slots ever requested, including clipped-off overflow
    cursor: AtomicUsize,
    /// Slots filled and published by completed reservations
    committed: AtomicUsize,
}

// SAFETY: concurrent access is partitioned by the reservation protocol —
// every slot is written by exactly one reservation holder, and reads only
// happen after all writers have committed (enforced by the pipeline's join
// barrier).
unsafe impl Sync for FileArena {}
unsafe impl Send for FileArena {}

impl FileArena {
    /// Create an arena that can hold at most `capacity` paths.
    pub fn with_capacity(capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            slots,
            cursor: AtomicUsize::new(0),
            committed: AtomicUsize::new(0),
        }
    }

    /// Fixed upper bound on the number of stored paths.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Reserve a window of up to `want` slots.
    ///
    /// The window is disjoint from every other reservation under arbitrary
    /// concurrency; no further synchronization is needed to fill it. When the
    /// arena is near capacity the grant is clipped, possibly to zero, and the
    /// shortfall shows up in [`Self::truncated`].
    pub fn reserve(&self, want: usize) -> Reservation<'_> {
        let start = self.cursor.fetch_add(want, Ordering::Relaxed);
        let capacity = self.capacity();
        let granted_start = start.min(capacity);
        let granted_end = start.saturating_add(want).min(capacity);
        Reservation {
            arena: self,
            start: granted_start,
            next: granted_start,
            end: granted_end,
        }
    }

    /// Number of committed entries.
    ///
    /// Stable only once all writers have passed the join barrier.
    pub fn len(&self) -> usize {
        self.committed.load(Ordering::Acquire)
    }

    /// Whether no entries have been committed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of paths dropped because the arena was full.
    pub fn truncated(&self) -> usize {
        self.cursor
            .load(Ordering::Acquire)
            .saturating_sub(self.capacity())
    }

    /// View the committed entries.
    ///
    /// Must only be called after all writers have finished (in the pipeline:
    /// after the discovery join barrier has been crossed); until then the
    /// committed prefix may still be growing.
    pub fn as_slice(&self) -> &[PathBuf] {
        let len = self.len();
        // SAFETY: reservations grant contiguous windows from the front, every
        // completed reservation fully initialized its window, and `committed`
        // was published with Release ordering. With all writers finished,
        // `0..len` is an initialized prefix.
        unsafe { std::slice::from_raw_parts(self.slots.as_ptr().cast::<PathBuf>(), len) }
    }
}

impl Drop for FileArena {
    fn drop(&mut self) {
        let len = *self.committed.get_mut();
        for slot in &mut self.slots[..len] {
            // SAFETY: `0..committed` is initialized; each slot is dropped
            // exactly once.
            unsafe { slot.get_mut().assume_init_drop() };
        }
    }
}

impl std::fmt::Debug for FileArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileArena")
            .field("capacity", &self.capacity())
            .field("committed", &self.committed)
            .field("cursor", &self.cursor)
            .finish()
    }
}

/// Exclusive ownership of a reserved slot window.
///
/// Push exactly as many paths as were granted; the commit happens on drop.
#[derive(Debug)]
pub struct Reservation<'a> {
    arena: &'a FileArena,
    start: usize,
    next: usize,
    end: usize,
}

impl Reservation<'_> {
    /// Number of slots still available in this window.
    pub fn remaining(&self) -> usize {
        self.end - self.next
    }

    /// Write one path into the window.
    ///
    /// Returns `false` (dropping the path) once the window is exhausted.
    pub fn push(&mut self, path: PathBuf) -> bool {
        if self.next == self.end {
            return false;
        }
        // SAFETY: `next` lies in this reservation's exclusive window and each
        // slot is written at most once.
        unsafe { (*self.arena.slots[self.next].get()).write(path) };
        self.next += 1;
        true
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        debug_assert_eq!(self.remaining(), 0, "reservation window left unfilled");
        // Publish the filled prefix. Release pairs with the Acquire load in
        // `len`; the join barrier orders the window's contents before any
        // reader.
        self.arena
            .committed
            .fetch_add(self.next - self.start, Ordering::Release);
    }
}

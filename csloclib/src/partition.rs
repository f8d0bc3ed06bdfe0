//! Even work partitioning.
//!
//! Splits an index space `[0, N)` into `T` contiguous, disjoint slices whose
//! sizes differ by at most one. Both pipeline phases use this: first over the
//! root-path count, then again over the discovered-file count.

use std::ops::Range;

/// A contiguous slice of a larger index range assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    /// First index covered by this partition
    pub offset: usize,
    /// Number of indices covered; may be zero when there are more workers
    /// than items
    pub len: usize,
}

impl Partition {
    /// The half-open index range this partition covers.
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.len
    }

    /// Whether this partition covers no items.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Split `total` items across `workers` partitions as evenly as possible.
///
/// The first `total % workers` partitions receive one extra item; offsets are
/// the running prefix sum. Deterministic, no failure mode. The caller must
/// validate `workers > 0` before the pipeline starts; this function treats a
/// zero worker count as a caller bug.
pub fn partition_items(total: usize, workers: usize) -> Vec<Partition> {
    assert!(workers > 0, "worker count validated at configuration time");

    let base = total / workers;
    let remainder = total % workers;

    let mut partitions = Vec::with_capacity(workers);
    let mut offset = 0;
    for index in 0..workers {
        let len = if index < remainder { base + 1 } else { base };
        partitions.push(Partition { offset, len });
        offset += len;
    }

    partitions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(total: usize, workers: usize) {
        let parts = partition_items(total, workers);
        assert_eq!(parts.len(), workers);

        // Sizes sum to the total and offsets are the prefix sum.
        let mut expected_offset = 0;
        for part in &parts {
            assert_eq!(part.offset, expected_offset);
            expected_offset += part.len;
        }
        assert_eq!(expected_offset, total);

        // Pairwise size difference of at most one.
        let min = parts.iter().map(|p| p.len).min().unwrap();
        let max = parts.iter().map(|p| p.len).max().unwrap();
        assert!(max - min <= 1);
    }

    #[test]
    fn test_even_split() {
        check(12, 4);
        let parts = partition_items(12, 4);
        assert!(parts.iter().all(|p| p.len == 3));
    }

    #[test]
    fn test_uneven_split_front_loads_remainder() {
        let parts = partition_items(10, 4);
        assert_eq!(
            parts.iter().map(|p| p.len).collect::<Vec<_>>(),
            vec![3, 3, 2, 2]
        );
        check(10, 4);
    }

    #[test]
    fn test_fewer_items_than_workers() {
        let parts = partition_items(2, 5);
        assert_eq!(
            parts.iter().map(|p| p.len).collect::<Vec<_>>(),
            vec![1, 1, 0, 0, 0]
        );
        check(2, 5);
    }

    #[test]
    fn test_zero_items() {
        let parts = partition_items(0, 3);
        assert!(parts.iter().all(|p| p.is_empty()));
        check(0, 3);
    }

    #[test]
    fn test_single_worker() {
        let parts = partition_items(7, 1);
        assert_eq!(parts[0].range(), 0..7);
    }

    #[test]
    fn test_many_combinations() {
        for total in [0, 1, 2, 7, 63, 64, 65, 1000] {
            for workers in [1, 2, 3, 8, 64] {
                check(total, workers);
            }
        }
    }

    #[test]
    #[should_panic]
    fn test_zero_workers_is_a_bug() {
        partition_items(10, 0);
    }
}

#![no_std]
#![forbid(unsafe_code)]

//! # FastSched Queue
//!
//! A bounded multi-producer / single-consumer queue for scheduled items.
//!
//! Producers push from any context, including interrupt service routines:
//! the push path is lock-free and wait-free and never blocks. Exactly one
//! consumer at a time drains the queue with
//! [`MpScheduleQueue::for_each_requeue`], which visits every item that
//! was enqueued before the drain began and either re-inserts it at the
//! tail or drops it, as the visitor decides. Items pushed while a drain
//! is in progress are not visited by that drain.
//!
//! Built on the lock-free MPMC ring from `heapless` plus an atomic
//! admission counter that bounds the number of live items at `N`. The
//! admission counter guarantees the ring always has room both for an
//! admitted push and for every re-insertion the drain performs, so a
//! surviving item can never be lost to a transiently full ring.

use core::sync::atomic::{AtomicUsize, Ordering};

use heapless::mpmc::MpMcQueue;

/// Bounded multi-producer schedule queue.
///
/// `N` must be a power of two (a `heapless` ring requirement). An item
/// is "live" from the moment its push is admitted until the drain drops
/// it; at most `N` items are live at once.
pub struct MpScheduleQueue<T, const N: usize> {
    ring: MpMcQueue<T, N>,
    live: AtomicUsize,
}

impl<T, const N: usize> MpScheduleQueue<T, N> {
    /// Create a new empty queue
    pub const fn new() -> Self {
        Self {
            ring: MpMcQueue::new(),
            live: AtomicUsize::new(0),
        }
    }

    /// Push an item from any context, including ISRs.
    ///
    /// Lock-free and wait-free against concurrent pushers; never blocks.
    /// Returns the item back to the caller when the queue already holds
    /// `N` live items.
    pub fn push(&self, item: T) -> Result<(), T> {
        let admitted = self.live.fetch_add(1, Ordering::AcqRel);
        if admitted >= N {
            self.live.fetch_sub(1, Ordering::AcqRel);
            return Err(item);
        }
        match self.ring.enqueue(item) {
            Ok(()) => Ok(()),
            // unreachable while the admission invariant holds
            Err(item) => {
                self.live.fetch_sub(1, Ordering::AcqRel);
                Err(item)
            }
        }
    }

    /// Drain traversal: visit each item present at entry exactly once.
    ///
    /// For every visited item the visitor decides its fate: `true`
    /// re-inserts it at the tail, `false` drops it and releases its
    /// admission slot. Items pushed after the traversal has begun are
    /// not visited.
    ///
    /// Single-consumer: the caller must ensure no other traversal runs
    /// concurrently. Producers may keep pushing throughout.
    pub fn for_each_requeue<F>(&self, mut visit: F)
    where
        F: FnMut(&mut T) -> bool,
    {
        // A push admitted before this load may not have landed in the
        // ring yet; the dequeue below then comes up empty and the item
        // simply waits for the next drain.
        let snapshot = self.live.load(Ordering::Acquire);
        for _ in 0..snapshot {
            let Some(mut item) = self.ring.dequeue() else {
                break;
            };
            if visit(&mut item) {
                let requeued = self.ring.enqueue(item);
                debug_assert!(requeued.is_ok());
            } else {
                self.live.fetch_sub(1, Ordering::AcqRel);
            }
        }
    }

    /// Number of live items
    pub fn len(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    /// Whether no items are live
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of live items
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<T, const N: usize> Default for MpScheduleQueue<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::vec::Vec;

    #[test]
    fn drains_in_fifo_order() {
        let queue: MpScheduleQueue<u32, 4> = MpScheduleQueue::new();
        queue.push(1).unwrap();
        queue.push(2).unwrap();
        queue.push(3).unwrap();

        let mut seen = Vec::new();
        queue.for_each_requeue(|item| {
            seen.push(*item);
            false
        });

        assert_eq!(seen, [1, 2, 3]);
        assert!(queue.is_empty());
    }

    #[test]
    fn push_fails_when_full_and_state_is_unchanged() {
        let queue: MpScheduleQueue<u32, 4> = MpScheduleQueue::new();
        for n in 0..4 {
            assert!(queue.push(n).is_ok());
        }
        assert_eq!(queue.push(99), Err(99));
        assert_eq!(queue.len(), 4);

        let mut seen = Vec::new();
        queue.for_each_requeue(|item| {
            seen.push(*item);
            false
        });
        assert_eq!(seen, [0, 1, 2, 3]);
    }

    #[test]
    fn requeued_items_survive_to_the_next_drain() {
        let queue: MpScheduleQueue<u32, 4> = MpScheduleQueue::new();
        queue.push(7).unwrap();
        queue.push(8).unwrap();

        // keep 7, drop 8
        queue.for_each_requeue(|item| *item == 7);
        assert_eq!(queue.len(), 1);

        let mut seen = Vec::new();
        queue.for_each_requeue(|item| {
            seen.push(*item);
            true
        });
        assert_eq!(seen, [7]);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn items_pushed_mid_drain_are_not_visited() {
        let queue: MpScheduleQueue<u32, 8> = MpScheduleQueue::new();
        queue.push(1).unwrap();
        queue.push(2).unwrap();

        let mut seen = Vec::new();
        queue.for_each_requeue(|item| {
            seen.push(*item);
            if *item == 1 {
                queue.push(42).unwrap();
            }
            true
        });

        assert_eq!(seen, [1, 2]);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn drop_releases_capacity_for_new_pushes() {
        let queue: MpScheduleQueue<u32, 2> = MpScheduleQueue::new();
        queue.push(1).unwrap();
        queue.push(2).unwrap();
        assert!(queue.push(3).is_err());

        queue.for_each_requeue(|_| false);
        assert!(queue.is_empty());
        assert!(queue.push(4).is_ok());
    }

    #[test]
    fn concurrent_pushers_never_lose_or_duplicate_items() {
        use std::sync::Arc;
        use std::thread;

        let queue: Arc<MpScheduleQueue<u32, 64>> = Arc::new(MpScheduleQueue::new());
        let mut handles = Vec::new();
        for producer in 0..4u32 {
            let queue = Arc::clone(&queue);
            handles.push(thread::spawn(move || {
                for n in 0..16u32 {
                    while queue.push(producer * 100 + n).is_err() {
                        thread::yield_now();
                    }
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let mut seen = Vec::new();
        queue.for_each_requeue(|item| {
            seen.push(*item);
            false
        });
        seen.sort_unstable();
        let mut expected: Vec<u32> = (0..4)
            .flat_map(|p| (0..16).map(move |n| p * 100 + n))
            .collect();
        expected.sort_unstable();
        assert_eq!(seen, expected);
    }
}

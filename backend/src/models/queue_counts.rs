//! Queue counters shown in every snapshot
//!
//! # Critical Invariants
//!
//! 1. `common + background <= capacity`
//! 2. `free == capacity - (common + background)`
//! 3. `c_queue <= background`: a C job waiting to resume still holds the
//!    background slot it took when it left the server, so it costs no extra
//!    capacity.

use serde::{Deserialize, Serialize};

/// Four counters describing how the waiting area is used
///
/// Every mutator moves exactly one job between places and keeps `free` in
/// step, so the invariants hold after each call.
///
/// # Example
///
/// ```rust
/// use repair_queue_simulator_core_rs::QueueCounts;
///
/// let mut counts = QueueCounts::new(9);
/// counts.push_common();
/// counts.move_to_background();
/// assert_eq!(counts.free, 7);
/// assert!(counts.is_consistent(9));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueCounts {
    /// Jobs waiting for first service
    pub common: usize,
    /// Backgrounded C jobs waiting for the busy server
    pub c_queue: usize,
    /// C jobs holding a background slot (including those in `c_queue`)
    pub background: usize,
    /// Unused slots
    pub free: usize,
}

impl QueueCounts {
    /// Empty waiting area with `capacity` slots
    pub fn new(capacity: usize) -> Self {
        Self {
            common: 0,
            c_queue: 0,
            background: 0,
            free: capacity,
        }
    }

    pub fn has_free_slot(&self) -> bool {
        self.free > 0
    }

    /// Total number of slots
    pub fn capacity(&self) -> usize {
        self.common + self.background + self.free
    }

    /// A new job joins the common queue
    ///
    /// # Panics
    /// Panics when no slot is free; admission control checks first.
    pub fn push_common(&mut self) {
        assert!(self.free > 0, "no free slot for common queue");
        self.common += 1;
        self.free -= 1;
    }

    /// The head of the common queue takes the server
    pub fn pop_common(&mut self) {
        assert!(self.common > 0, "common queue counter underflow");
        self.common -= 1;
        self.free += 1;
    }

    /// An in-service C job takes a background slot
    pub fn move_to_background(&mut self) {
        assert!(self.free > 0, "no free slot for background job");
        self.background += 1;
        self.free -= 1;
    }

    /// A backgrounded job returns straight to an idle server
    pub fn resume_from_background(&mut self) {
        assert!(
            self.background > self.c_queue,
            "no unqueued background job to resume"
        );
        self.background -= 1;
        self.free += 1;
    }

    /// A backgrounded job finds the server busy; it keeps its slot
    pub fn push_c_queue(&mut self) {
        assert!(
            self.background > self.c_queue,
            "no unqueued background job to enqueue"
        );
        self.c_queue += 1;
    }

    /// The head of the C queue takes the server and releases its slot
    pub fn pop_c_queue(&mut self) {
        assert!(self.c_queue > 0, "c queue counter underflow");
        self.c_queue -= 1;
        self.background -= 1;
        self.free += 1;
    }

    /// Check the invariants against a known capacity
    pub fn is_consistent(&self, capacity: usize) -> bool {
        self.common + self.background <= capacity
            && self.free == capacity - (self.common + self.background)
            && self.c_queue <= self.background
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_c_queue_restores_capacity() {
        let mut counts = QueueCounts::new(3);
        counts.move_to_background();
        counts.push_c_queue();
        assert_eq!(counts.free, 2);
        assert!(counts.is_consistent(3));

        counts.pop_c_queue();
        assert_eq!(counts, QueueCounts::new(3));
    }

    #[test]
    fn test_full_area_has_no_free_slot() {
        let mut counts = QueueCounts::new(2);
        counts.push_common();
        counts.move_to_background();
        assert!(!counts.has_free_slot());
        assert!(counts.is_consistent(2));
        assert_eq!(counts.capacity(), 2);
    }

    #[test]
    #[should_panic(expected = "no free slot for common queue")]
    fn test_push_common_on_full_area_panics() {
        let mut counts = QueueCounts::new(1);
        counts.push_common();
        counts.push_common();
    }

    #[test]
    fn test_inconsistent_counts_detected() {
        let counts = QueueCounts {
            common: 2,
            c_queue: 0,
            background: 1,
            free: 5,
        };
        assert!(!counts.is_consistent(9));
    }
}

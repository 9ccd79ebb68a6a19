//! Pending-event set
//!
//! A min-heap on event time. Simultaneous events leave in the order they
//! were scheduled (an insertion sequence number breaks ties), which keeps
//! runs reproducible without giving any event kind priority over another.

use crate::models::{Event, EventKind, JobId};
use crate::orchestrator::SimulationError;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug, Clone)]
struct Scheduled {
    seq: u64,
    event: Event,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// BinaryHeap is a max-heap: reverse both keys so the earliest, oldest event is on top
impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        self.event
            .time()
            .total_cmp(&other.event.time())
            .then_with(|| self.seq.cmp(&other.seq))
            .reverse()
    }
}

/// Time-ordered set of pending events
///
/// # Example
///
/// ```rust
/// use repair_queue_simulator_core_rs::{Event, EventKind, EventScheduler};
///
/// let mut scheduler = EventScheduler::new();
/// scheduler.schedule(Event::arrival(2.0));
/// scheduler.schedule(Event::for_job(EventKind::Complete, 1.0, 1));
///
/// let next = scheduler.pop_next(0.0).unwrap();
/// assert_eq!(next.kind(), EventKind::Complete);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventScheduler {
    heap: BinaryHeap<Scheduled>,
    next_seq: u64,
}

impl EventScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an event to the pending set
    pub fn schedule(&mut self, event: Event) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Scheduled { seq, event });
    }

    /// Remove and return the earliest pending event
    ///
    /// `clock` is only used to describe the failure.
    ///
    /// # Errors
    ///
    /// `SimulationError::EmptyScheduler` when nothing is pending. While the
    /// run is below its horizon an arrival is always pending, so this means
    /// the engine broke an invariant.
    pub fn pop_next(&mut self, clock: f64) -> Result<Event, SimulationError> {
        self.heap
            .pop()
            .map(|s| s.event)
            .ok_or(SimulationError::EmptyScheduler { clock })
    }

    /// Drop the pending event of `kind` for `job`
    ///
    /// Returns whether such an event was pending.
    pub fn cancel(&mut self, kind: EventKind, job: JobId) -> bool {
        let before = self.heap.len();
        self.heap
            .retain(|s| !(s.event.kind() == kind && s.event.job() == Some(job)));
        let removed = before - self.heap.len();
        debug_assert!(removed <= 1, "job {} had {} pending {:?} events", job, removed, kind);
        removed > 0
    }

    /// Time of the earliest pending event
    pub fn peek_time(&self) -> Option<f64> {
        self.heap.peek().map(|s| s.event.time())
    }

    /// Whether an event of `kind` is pending for `job`
    pub fn is_pending(&self, kind: EventKind, job: JobId) -> bool {
        self.heap
            .iter()
            .any(|s| s.event.kind() == kind && s.event.job() == Some(job))
    }

    /// Number of pending arrivals (exactly one during a healthy run)
    pub fn pending_arrivals(&self) -> usize {
        self.heap
            .iter()
            .filter(|s| s.event.kind() == EventKind::Arrival)
            .count()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.next_seq = 0;
    }
}

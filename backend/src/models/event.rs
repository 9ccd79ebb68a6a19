//! Scheduled simulation events
//!
//! Events are small value objects handed to the scheduler by the handlers and
//! consumed exactly once. They refer to jobs by id, never by reference; the
//! job itself lives in the registry of [`SimulationState`].
//!
//! # Event Types
//!
//! - **Arrival**: a new job shows up (no job attached yet)
//! - **SwitchToBackground**: a type C job leaves the server unattended
//! - **Resume**: a backgrounded C job asks for the server back
//! - **Complete**: service ends and the job departs
//!
//! [`SimulationState`]: crate::models::SimulationState

use super::job::JobId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What happens when an event fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Arrival,
    SwitchToBackground,
    Resume,
    Complete,
}

impl EventKind {
    /// Name used in snapshot labels
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Arrival => "Arrival",
            EventKind::SwitchToBackground => "SwitchToBackground",
            EventKind::Resume => "Resume",
            EventKind::Complete => "Complete",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A pending or dispatched event
///
/// # Example
///
/// ```rust
/// use repair_queue_simulator_core_rs::{Event, EventKind};
///
/// let arrival = Event::arrival(0.4);
/// assert_eq!(arrival.kind(), EventKind::Arrival);
/// assert_eq!(arrival.job(), None);
///
/// let done = Event::for_job(EventKind::Complete, 1.2, 5);
/// assert_eq!(done.job(), Some(5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    kind: EventKind,
    time: f64,
    job: Option<JobId>,
}

impl Event {
    /// Generic arrival; the job is created only if it is admitted
    pub fn arrival(time: f64) -> Self {
        Self {
            kind: EventKind::Arrival,
            time,
            job: None,
        }
    }

    /// Event concerning an already admitted job
    pub fn for_job(kind: EventKind, time: f64, job: JobId) -> Self {
        debug_assert!(kind != EventKind::Arrival, "arrivals carry no job");
        Self {
            kind,
            time,
            job: Some(job),
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Scheduled time (hours)
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn job(&self) -> Option<JobId> {
        self.job
    }
}

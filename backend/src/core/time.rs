//! Simulated time
//!
//! The simulation clock runs in hours (f64). Parameters that users express in
//! minutes are converted once, when the configuration is resolved.

use serde::{Deserialize, Serialize};

/// Minutes in one simulated hour
pub const MINUTES_PER_HOUR: f64 = 60.0;

/// Convert a duration in minutes to clock units (hours)
///
/// # Example
/// ```
/// use repair_queue_simulator_core_rs::core::time::minutes_to_hours;
///
/// assert_eq!(minutes_to_hours(30.0), 0.5);
/// ```
pub fn minutes_to_hours(minutes: f64) -> f64 {
    minutes / MINUTES_PER_HOUR
}

/// Event-driven simulation clock
///
/// Unlike a ticking clock, it jumps straight to the time of each processed
/// event and remembers where it was before the jump, so handlers can charge
/// the elapsed interval to the server.
///
/// # Example
/// ```
/// use repair_queue_simulator_core_rs::SimClock;
///
/// let mut clock = SimClock::new();
/// clock.advance_to(1.5);
/// assert_eq!(clock.now(), 1.5);
/// assert_eq!(clock.elapsed_since_previous(), 1.5);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimClock {
    now: f64,
    previous: f64,
}

impl SimClock {
    /// Create a clock at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated time (hours)
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Time of the previously processed event (hours)
    pub fn previous(&self) -> f64 {
        self.previous
    }

    /// Jump to the time of the next event
    ///
    /// # Panics
    /// Panics if `time` lies in the past; the scheduler never hands out
    /// such events.
    pub fn advance_to(&mut self, time: f64) {
        assert!(
            time >= self.now,
            "clock cannot move backwards ({} -> {})",
            self.now,
            time
        );
        self.previous = self.now;
        self.now = time;
    }

    /// Length of the interval that just ended
    pub fn elapsed_since_previous(&self) -> f64 {
        self.now - self.previous
    }

    /// Back to time zero
    pub fn reset(&mut self) {
        self.now = 0.0;
        self.previous = 0.0;
    }
}

//! The single shared server (the technician)

use serde::{Deserialize, Serialize};

/// Whether the server is attending a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerOccupancy {
    Free,
    Busy,
}

/// Server status plus the two running accumulators
///
/// `busy_time` and `sojourn_time` only ever grow. The struct is `Copy`, so
/// a snapshot always holds its own value, never a view of the live server.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServerState {
    pub occupancy: ServerOccupancy,
    /// Cumulative time spent Busy (hours)
    pub busy_time: f64,
    /// Sum of (departure − arrival) over completed jobs (hours)
    pub sojourn_time: f64,
}

impl Default for ServerState {
    fn default() -> Self {
        Self {
            occupancy: ServerOccupancy::Free,
            busy_time: 0.0,
            sojourn_time: 0.0,
        }
    }
}

impl ServerState {
    pub fn is_busy(&self) -> bool {
        self.occupancy == ServerOccupancy::Busy
    }

    pub fn set_busy(&mut self) {
        self.occupancy = ServerOccupancy::Busy;
    }

    pub fn set_free(&mut self) {
        self.occupancy = ServerOccupancy::Free;
    }

    /// Charge an elapsed interval to the server
    pub fn accumulate_busy(&mut self, elapsed: f64) {
        debug_assert!(elapsed >= 0.0, "negative busy interval {}", elapsed);
        self.busy_time += elapsed;
    }

    /// Add one departed job's time in the system
    pub fn accumulate_sojourn(&mut self, sojourn: f64) {
        debug_assert!(sojourn >= 0.0, "negative sojourn {}", sojourn);
        self.sojourn_time += sojourn;
    }
}

//! Run statistics
//!
//! Running values feed every snapshot row and read 0 while undefined. Final
//! values are `None` when no job completed.

use crate::models::SimulationState;
use serde::{Deserialize, Serialize};

/// Cumulative sojourn over admitted jobs (0 before any admission)
pub fn running_mean_sojourn(state: &SimulationState) -> f64 {
    match state.jobs_admitted() {
        0 => 0.0,
        n => state.server().sojourn_time / n as f64,
    }
}

/// Share of elapsed time the server was busy, in percent (0 at time zero)
pub fn running_utilization_pct(state: &SimulationState, clock: f64) -> f64 {
    if clock <= 0.0 {
        return 0.0;
    }
    (state.server().busy_time / clock * 100.0).clamp(0.0, 100.0)
}

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub jobs_admitted: usize,
    pub jobs_completed: usize,
    pub busy_time: f64,
    pub mean_sojourn_time: Option<f64>,
    pub server_utilization_pct: Option<f64>,
}

impl Statistics {
    /// Final aggregates at `clock`
    pub fn collect(state: &SimulationState, clock: f64) -> Self {
        let completed = state.jobs_completed() > 0;
        Self {
            jobs_admitted: state.jobs_admitted(),
            jobs_completed: state.jobs_completed(),
            busy_time: state.server().busy_time,
            mean_sojourn_time: completed.then(|| running_mean_sojourn(state)),
            server_utilization_pct: completed.then(|| running_utilization_pct(state, clock)),
        }
    }
}

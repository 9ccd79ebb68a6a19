//! Random draws recorded alongside each snapshot row

use super::job::JobType;
use serde::{Deserialize, Serialize};

/// Arrival-side draws of one step
///
/// `next_arrival` is always known (exactly one arrival is pending at any
/// time); the other fields are set only on the step that drew them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrivalDraw {
    /// Inter-arrival gap drawn at this step (hours)
    pub interarrival: Option<f64>,
    /// Time of the pending arrival
    pub next_arrival: f64,
    /// Job type drawn for an admitted arrival
    pub job_type: Option<JobType>,
}

impl ArrivalDraw {
    /// Fresh arrival draw
    pub fn drawn(interarrival: f64, next_arrival: f64) -> Self {
        Self {
            interarrival: Some(interarrival),
            next_arrival,
            job_type: None,
        }
    }

    /// Carry the pending arrival into a step that drew nothing new
    pub fn carried(previous: &ArrivalDraw) -> Self {
        Self {
            interarrival: None,
            next_arrival: previous.next_arrival,
            job_type: None,
        }
    }
}

/// Service-side draws of one step
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionDraw {
    /// Attention time assigned at this step (hours)
    pub service_time: Option<f64>,
    /// Completion time of the assigned work; carried forward otherwise
    pub completion_time: Option<f64>,
}

impl CompletionDraw {
    pub fn drawn(service_time: f64, completion_time: f64) -> Self {
        Self {
            service_time: Some(service_time),
            completion_time: Some(completion_time),
        }
    }

    /// Keep showing the previous completion time
    pub fn carried(previous: &CompletionDraw) -> Self {
        Self {
            service_time: None,
            completion_time: previous.completion_time,
        }
    }

    /// Nothing to show (the server went idle)
    pub fn none() -> Self {
        Self::default()
    }
}

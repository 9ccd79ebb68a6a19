//! Random variate generators
//!
//! Turns uniform draws from [`RngManager`] into the three quantities the
//! model needs:
//!
//! 1. **Inter-arrival gaps**: exponential with a configured mean
//! 2. **Job types**: categorical over the four configured probabilities
//! 3. **Service durations**: the per-type mean, perturbed by a uniform draw
//!    centred on the midpoint of the configured bounds
//!
//! Generators hold parameters already resolved to hours; nothing is converted
//! per draw.
//!
//! # Example
//!
//! ```
//! use repair_queue_simulator_core_rs::variates::{ArrivalGenerator, ServiceTimeGenerator};
//! use repair_queue_simulator_core_rs::{JobType, RngManager};
//!
//! let mut rng = RngManager::new(42);
//! let arrivals = ArrivalGenerator::new(0.5, [0.4, 0.3, 0.2, 0.1]);
//! let draw = arrivals.next_arrival(1.0, &mut rng);
//! assert!(draw.next_arrival >= 1.0);
//!
//! let service = ServiceTimeGenerator::new([0.5, 0.6, 1.0, 0.8], 20.0 / 60.0, 40.0 / 60.0);
//! let d = service.draw(JobType::C, &mut rng);
//! assert!(d > 1.0 - 10.0 / 60.0 - 1e-9 && d < 1.0 + 10.0 / 60.0 + 1e-9);
//! ```

use crate::models::{ArrivalDraw, JobType};
use crate::rng::RngManager;

/// Exponential arrivals with categorical job types
#[derive(Debug, Clone)]
pub struct ArrivalGenerator {
    mean_interarrival: f64,
    /// Running sums of the type probabilities
    cumulative: [f64; 4],
    /// Last type with non-zero probability (absorbs rounding at the top end)
    fallback: JobType,
}

impl ArrivalGenerator {
    /// # Arguments
    ///
    /// * `mean_interarrival` - Mean gap between arrivals (hours, > 0)
    /// * `probabilities` - P(A), P(B), P(C), P(D); validated to sum to 1
    pub fn new(mean_interarrival: f64, probabilities: [f64; 4]) -> Self {
        let mut cumulative = [0.0; 4];
        let mut acc = 0.0;
        for (slot, p) in cumulative.iter_mut().zip(probabilities.iter()) {
            acc += p;
            *slot = acc;
        }
        let fallback = JobType::ALL
            .iter()
            .rev()
            .copied()
            .find(|t| probabilities[t.index()] > 0.0)
            .unwrap_or(JobType::D);

        Self {
            mean_interarrival,
            cumulative,
            fallback,
        }
    }

    /// Draw the gap to the next arrival, counted from `now`
    pub fn next_arrival(&self, now: f64, rng: &mut RngManager) -> ArrivalDraw {
        let gap = rng.exponential(self.mean_interarrival);
        ArrivalDraw::drawn(gap, now + gap)
    }

    /// Pick the type of an admitted job
    pub fn draw_job_type(&self, rng: &mut RngManager) -> JobType {
        let u = rng.next_f64();
        JobType::ALL
            .iter()
            .copied()
            .zip(self.cumulative.iter())
            .find(|(_, bound)| u < **bound)
            .map(|(t, _)| t)
            .unwrap_or(self.fallback)
    }
}

/// Service durations per job type
#[derive(Debug, Clone)]
pub struct ServiceTimeGenerator {
    /// Mean duration per type (hours)
    means: [f64; 4],
    /// Uniform perturbation bounds (hours)
    lower: f64,
    upper: f64,
}

impl ServiceTimeGenerator {
    pub fn new(means: [f64; 4], lower: f64, upper: f64) -> Self {
        Self {
            means,
            lower,
            upper,
        }
    }

    /// Duration of a fresh service (hours, never negative)
    ///
    /// `mean + U(lower, upper) − (lower + upper) / 2`: the uniform draw
    /// spreads durations symmetrically around the type's mean.
    pub fn draw(&self, job_type: JobType, rng: &mut RngManager) -> f64 {
        let midpoint = (self.lower + self.upper) / 2.0;
        let offset = rng.uniform(self.lower, self.upper) - midpoint;
        (self.means[job_type.index()] + offset).max(0.0)
    }

    /// Mean configured for a type (hours)
    pub fn mean(&self, job_type: JobType) -> f64 {
        self.means[job_type.index()]
    }
}

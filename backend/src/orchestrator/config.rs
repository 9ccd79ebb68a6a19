//! Simulation configuration
//!
//! [`SimulationConfig`] is the record users write (TOML, JSON, a Python
//! dict). Durations follow the reference form: hours, except the service
//! bounds and the two type C offsets which are minutes.
//! [`SimulationConfig::resolve`] validates it and converts everything to hours
//! exactly once, producing the [`ResolvedConfig`] the engine runs on.
//!
//! # Example
//!
//! ```rust
//! use repair_queue_simulator_core_rs::SimulationConfig;
//!
//! let config: SimulationConfig = serde_json::from_str(r#"{
//!     "simulation_horizon": 8.0,
//!     "job_type_probabilities": [0.4, 0.3, 0.2, 0.1],
//!     "mean_service_time": [0.5, 0.6, 1.0, 0.8],
//!     "service_time_uniform_bounds": [20.0, 40.0],
//!     "c_background_delay_minutes": 30.0,
//!     "c_resume_lead_minutes": 10.0,
//!     "reporting_start_time": 0.0,
//!     "max_reported_rows": 50
//! }"#).unwrap();
//!
//! let resolved = config.resolve().unwrap();
//! assert_eq!(resolved.c_background_delay, 0.5);
//! assert_eq!(resolved.capacity, 9);
//! ```

use crate::core::time::minutes_to_hours;
use crate::orchestrator::SimulationError;
use serde::{Deserialize, Serialize};

/// Waiting slots in the reference shop
pub const DEFAULT_CAPACITY: usize = 9;

/// Mean gap between arrivals when none is configured (hours)
pub const DEFAULT_MEAN_INTERARRIVAL_HOURS: f64 = 0.5;

pub const DEFAULT_RNG_SEED: u64 = 12345;

/// Allowed distance of the probability sum from 1
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_mean_interarrival() -> f64 {
    DEFAULT_MEAN_INTERARRIVAL_HOURS
}

fn default_rng_seed() -> u64 {
    DEFAULT_RNG_SEED
}

/// User-facing simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Stop once the clock reaches this time (hours)
    pub simulation_horizon: f64,

    /// P(A), P(B), P(C), P(D); must sum to 1
    pub job_type_probabilities: [f64; 4],

    /// Mean service time per type (hours)
    pub mean_service_time: [f64; 4],

    /// Uniform perturbation bounds `[lower, upper]` (minutes)
    pub service_time_uniform_bounds: [f64; 2],

    /// Time a C job spends on the server before going to background (minutes)
    pub c_background_delay_minutes: f64,

    /// How long before completion a C job must be back on the server (minutes)
    pub c_resume_lead_minutes: f64,

    /// Rows before this clock value are not reported (hours)
    pub reporting_start_time: f64,

    /// Maximum rows reported from the window (the final row may be added)
    pub max_reported_rows: usize,

    /// Mean gap between arrivals (hours)
    #[serde(default = "default_mean_interarrival")]
    pub mean_interarrival_hours: f64,

    /// Waiting slots shared by the common queue and backgrounded jobs
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Seed for the deterministic generator
    #[serde(default = "default_rng_seed")]
    pub rng_seed: u64,
}

impl SimulationConfig {
    /// The reference scenario: an 8 hour day with the reference job mix
    pub fn reference() -> Self {
        Self {
            simulation_horizon: 8.0,
            job_type_probabilities: [0.4, 0.3, 0.2, 0.1],
            mean_service_time: [0.5, 0.6, 1.0, 0.8],
            service_time_uniform_bounds: [20.0, 40.0],
            c_background_delay_minutes: 30.0,
            c_resume_lead_minutes: 10.0,
            reporting_start_time: 0.0,
            max_reported_rows: 50,
            mean_interarrival_hours: DEFAULT_MEAN_INTERARRIVAL_HOURS,
            capacity: DEFAULT_CAPACITY,
            rng_seed: DEFAULT_RNG_SEED,
        }
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// `SimulationError::InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if !self.simulation_horizon.is_finite() || self.simulation_horizon <= 0.0 {
            return Err(invalid(format!(
                "simulation_horizon must be a positive number, got {}",
                self.simulation_horizon
            )));
        }

        for (i, p) in self.job_type_probabilities.iter().enumerate() {
            if !p.is_finite() || !(0.0..=1.0).contains(p) {
                return Err(invalid(format!(
                    "job_type_probabilities[{}] must lie in [0, 1], got {}",
                    i, p
                )));
            }
        }
        let sum: f64 = self.job_type_probabilities.iter().sum();
        if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(invalid(format!(
                "job_type_probabilities must sum to 1, got {}",
                sum
            )));
        }

        for (i, m) in self.mean_service_time.iter().enumerate() {
            non_negative(&format!("mean_service_time[{}]", i), *m)?;
        }

        let [lower, upper] = self.service_time_uniform_bounds;
        if !lower.is_finite() || !upper.is_finite() {
            return Err(invalid(format!(
                "service_time_uniform_bounds must be finite, got [{}, {}]",
                lower, upper
            )));
        }
        if lower > upper {
            return Err(invalid(format!(
                "service_time_uniform_bounds lower {} exceeds upper {}",
                lower, upper
            )));
        }

        non_negative("c_background_delay_minutes", self.c_background_delay_minutes)?;
        non_negative("c_resume_lead_minutes", self.c_resume_lead_minutes)?;
        non_negative("reporting_start_time", self.reporting_start_time)?;

        if !self.mean_interarrival_hours.is_finite() || self.mean_interarrival_hours <= 0.0 {
            return Err(invalid(format!(
                "mean_interarrival_hours must be positive, got {}",
                self.mean_interarrival_hours
            )));
        }

        if self.capacity == 0 {
            return Err(invalid("capacity must be > 0".to_string()));
        }

        Ok(())
    }

    /// Validate and convert to engine units (hours)
    pub fn resolve(&self) -> Result<ResolvedConfig, SimulationError> {
        self.validate()?;
        let [lower, upper] = self.service_time_uniform_bounds;
        Ok(ResolvedConfig {
            horizon: self.simulation_horizon,
            job_type_probabilities: self.job_type_probabilities,
            mean_service_time: self.mean_service_time,
            service_lower: minutes_to_hours(lower),
            service_upper: minutes_to_hours(upper),
            c_background_delay: minutes_to_hours(self.c_background_delay_minutes),
            c_resume_lead: minutes_to_hours(self.c_resume_lead_minutes),
            reporting_start: self.reporting_start_time,
            max_reported_rows: self.max_reported_rows,
            mean_interarrival: self.mean_interarrival_hours,
            capacity: self.capacity,
            rng_seed: self.rng_seed,
        })
    }
}

fn invalid(msg: String) -> SimulationError {
    SimulationError::InvalidConfig(msg)
}

fn non_negative(field: &str, value: f64) -> Result<(), SimulationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(format!(
            "{} must be a non-negative number, got {}",
            field, value
        )));
    }
    Ok(())
}

/// Validated parameters, every duration in hours
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedConfig {
    pub horizon: f64,
    pub job_type_probabilities: [f64; 4],
    pub mean_service_time: [f64; 4],
    pub service_lower: f64,
    pub service_upper: f64,
    pub c_background_delay: f64,
    pub c_resume_lead: f64,
    pub reporting_start: f64,
    pub max_reported_rows: usize,
    pub mean_interarrival: f64,
    pub capacity: usize,
    pub rng_seed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_config_is_valid() {
        assert!(SimulationConfig::reference().validate().is_ok());
    }

    #[test]
    fn test_resolve_converts_minutes_once() {
        let resolved = SimulationConfig::reference().resolve().unwrap();
        assert!((resolved.service_lower - 20.0 / 60.0).abs() < 1e-12);
        assert!((resolved.service_upper - 40.0 / 60.0).abs() < 1e-12);
        assert!((resolved.c_resume_lead - 10.0 / 60.0).abs() < 1e-12);
        // hour-based fields untouched
        assert_eq!(resolved.horizon, 8.0);
        assert_eq!(resolved.mean_service_time, [0.5, 0.6, 1.0, 0.8]);
    }

    #[test]
    fn test_probability_sum_mismatch_rejected() {
        let mut config = SimulationConfig::reference();
        config.job_type_probabilities = [0.4, 0.3, 0.2, 0.2];
        match config.validate() {
            Err(SimulationError::InvalidConfig(msg)) => assert!(msg.contains("sum to 1")),
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_nan_delay_rejected() {
        let mut config = SimulationConfig::reference();
        config.c_background_delay_minutes = f64::NAN;
        assert!(config.validate().is_err());
    }
}

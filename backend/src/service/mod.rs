//! Request/response layer
//!
//! Maps an external [`SimulationRequest`] to one engine run and keeps the full
//! history of the most recent run so callers can page through it.
//!
//! Every call to [`SimulationService::simulate`] builds its own [`Engine`];
//! only the last history is shared, behind a mutex.
//!
//! # Example
//!
//! ```rust
//! use repair_queue_simulator_core_rs::service::{SimulationRequest, SimulationService};
//! use repair_queue_simulator_core_rs::SimulationConfig;
//!
//! let service = SimulationService::new();
//! let mut request = SimulationRequest::from(SimulationConfig::reference());
//! request.seed = Some(42);
//!
//! let response = service.simulate(&request).unwrap();
//! assert_eq!(response.seed, 42);
//!
//! let first_page = service.page(0).unwrap();
//! assert_eq!(first_page[0].label, "Start");
//! ```

use crate::orchestrator::{
    Engine, SimulationConfig, SimulationError, StateSnapshot, Termination,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Rows per history page
pub const PAGE_SIZE: usize = 200;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error("no simulation has been run yet")]
    NoHistory,

    #[error("page {page} out of range ({pages} pages)")]
    PageOutOfRange { page: usize, pages: usize },
}

/// Simulation parameters as sent by a client
///
/// Same fields as [`SimulationConfig`]; optional ones fall back to the
/// configuration defaults, and a missing seed is replaced by a fresh one.
/// Unknown keys are rejected so a misspelled field cannot fall back silently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationRequest {
    pub simulation_horizon: f64,
    pub job_type_probabilities: [f64; 4],
    pub mean_service_time: [f64; 4],
    pub service_time_uniform_bounds: [f64; 2],
    pub c_background_delay_minutes: f64,
    pub c_resume_lead_minutes: f64,
    pub reporting_start_time: f64,
    pub max_reported_rows: usize,

    #[serde(default)]
    pub mean_interarrival_hours: Option<f64>,

    #[serde(default)]
    pub capacity: Option<usize>,

    #[serde(default, alias = "rng_seed")]
    pub seed: Option<u64>,
}

impl SimulationRequest {
    /// Engine configuration for this request, run with `seed`
    pub fn to_config(&self, seed: u64) -> SimulationConfig {
        let defaults = SimulationConfig::reference();
        SimulationConfig {
            simulation_horizon: self.simulation_horizon,
            job_type_probabilities: self.job_type_probabilities,
            mean_service_time: self.mean_service_time,
            service_time_uniform_bounds: self.service_time_uniform_bounds,
            c_background_delay_minutes: self.c_background_delay_minutes,
            c_resume_lead_minutes: self.c_resume_lead_minutes,
            reporting_start_time: self.reporting_start_time,
            max_reported_rows: self.max_reported_rows,
            mean_interarrival_hours: self
                .mean_interarrival_hours
                .unwrap_or(defaults.mean_interarrival_hours),
            capacity: self.capacity.unwrap_or(defaults.capacity),
            rng_seed: seed,
        }
    }
}

impl From<SimulationConfig> for SimulationRequest {
    fn from(config: SimulationConfig) -> Self {
        Self {
            simulation_horizon: config.simulation_horizon,
            job_type_probabilities: config.job_type_probabilities,
            mean_service_time: config.mean_service_time,
            service_time_uniform_bounds: config.service_time_uniform_bounds,
            c_background_delay_minutes: config.c_background_delay_minutes,
            c_resume_lead_minutes: config.c_resume_lead_minutes,
            reporting_start_time: config.reporting_start_time,
            max_reported_rows: config.max_reported_rows,
            mean_interarrival_hours: Some(config.mean_interarrival_hours),
            capacity: Some(config.capacity),
            seed: Some(config.rng_seed),
        }
    }
}

/// Result returned to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResponse {
    pub run_id: String,
    /// Seed actually used (echoed so the run can be repeated)
    pub seed: u64,
    pub config_hash: String,
    pub mean_sojourn_time: Option<f64>,
    pub server_utilization_pct: Option<f64>,
    pub total_reported_rows: usize,
    pub reported_snapshots: Vec<StateSnapshot>,
    pub termination: Termination,
}

/// Seed for requests that bring none
pub fn fresh_seed() -> u64 {
    let bits = Uuid::new_v4().as_u128();
    (bits as u64) ^ ((bits >> 64) as u64)
}

/// Runs simulations and serves pages of the last history
#[derive(Debug, Default)]
pub struct SimulationService {
    last_history: Mutex<Option<Arc<Vec<StateSnapshot>>>>,
}

impl SimulationService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one simulation and remember its history
    pub fn simulate(&self, request: &SimulationRequest) -> Result<SimulationResponse, ServiceError> {
        let seed = request.seed.unwrap_or_else(fresh_seed);
        let run_id = Uuid::new_v4().to_string();

        let result = Engine::new(&request.to_config(seed))?.run()?;
        info!(
            run_id = %run_id,
            seed,
            rows = result.history.len(),
            reported = result.total_reported_rows(),
            "run stored"
        );

        let response = SimulationResponse {
            run_id,
            seed,
            config_hash: result.config_hash.clone(),
            mean_sojourn_time: result.statistics.mean_sojourn_time,
            server_utilization_pct: result.statistics.server_utilization_pct,
            total_reported_rows: result.total_reported_rows(),
            reported_snapshots: result.reported,
            termination: result.termination,
        };

        *self.lock() = Some(Arc::new(result.history));
        Ok(response)
    }

    /// Page `index` of the last run's full history
    pub fn page(&self, index: usize) -> Result<Vec<StateSnapshot>, ServiceError> {
        let history = self.lock().clone().ok_or(ServiceError::NoHistory)?;
        paginate(&history, index)
    }

    /// Number of pages in the last run's history
    pub fn page_count(&self) -> Result<usize, ServiceError> {
        let guard = self.lock();
        let history = guard.as_ref().ok_or(ServiceError::NoHistory)?;
        Ok(page_count(history.len()))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Arc<Vec<StateSnapshot>>>> {
        // a panic while holding the lock cannot leave the Option half-written
        self.last_history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Pages needed for `rows` rows (a short history is one page)
pub fn page_count(rows: usize) -> usize {
    if rows <= PAGE_SIZE {
        1
    } else {
        rows.div_ceil(PAGE_SIZE)
    }
}

/// Slice one page out of `history`, closed by the final row
///
/// # Errors
///
/// `ServiceError::NoHistory` for an empty history,
/// `ServiceError::PageOutOfRange` past the last page.
pub fn paginate(history: &[StateSnapshot], index: usize) -> Result<Vec<StateSnapshot>, ServiceError> {
    let last = history.last().ok_or(ServiceError::NoHistory)?;
    let pages = page_count(history.len());
    if index >= pages {
        return Err(ServiceError::PageOutOfRange { page: index, pages });
    }

    let start = index * PAGE_SIZE;
    let end = ((index + 1) * PAGE_SIZE).min(history.len());
    let mut rows = history[start..end].to_vec();
    if rows.last().map(|s| s.step) != Some(last.step) {
        rows.push(last.clone());
    }
    Ok(rows)
}

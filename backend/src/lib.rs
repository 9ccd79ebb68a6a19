//! Repair Queue Simulator Core - Rust Engine
//!
//! Discrete-event simulation of a repair shop: one technician, four job types
//! and a type C job that is left running unattended mid-service.
//!
//! # Architecture
//!
//! - **core**: Simulation clock (hours)
//! - **rng**: Deterministic random number generation
//! - **variates**: Inter-arrival, job type and service time draws
//! - **models**: Domain types (Job, Event, QueueCounts, ServerState, State)
//! - **scheduler**: Time-ordered pending events
//! - **orchestrator**: Configuration, event loop, snapshots, statistics
//! - **service**: Request/response records and history pagination
//!
//! # Critical Invariants
//!
//! 1. All randomness is deterministic (seeded RNG)
//! 2. `free = capacity - common - background` after every event
//! 3. A snapshot never changes once recorded

// Module declarations
pub mod core;
pub mod models;
pub mod orchestrator;
pub mod rng;
pub mod scheduler;
pub mod service;
pub mod variates;

// Re-exports for convenience
pub use crate::core::time::SimClock;
pub use models::{
    ArrivalDraw, CompletionDraw, Event, EventKind, Job, JobError, JobId, JobStatus, JobType,
    QueueCounts, ServerOccupancy, ServerState, SimulationState,
};
pub use orchestrator::{
    run_simulation, Engine, HistoryLog, JobSnapshot, ResolvedConfig, SimulationConfig,
    SimulationError, SimulationResult, StateSnapshot, Statistics, Termination,
};
pub use rng::RngManager;
pub use scheduler::EventScheduler;
pub use service::{ServiceError, SimulationRequest, SimulationResponse, SimulationService};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn repair_queue_simulator_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::simulator::PySimulator>()?;
    Ok(())
}

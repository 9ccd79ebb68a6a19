//! Orchestrator - configuration, event loop, snapshots and statistics
//!
//! See `engine.rs` for the event loop.

pub mod config;
pub mod engine;
pub mod snapshot;
pub mod stats;

// Re-export main types for convenience
pub use config::{ResolvedConfig, SimulationConfig};
pub use engine::{
    run_simulation, Engine, SimulationError, SimulationResult, Termination, MAX_ITERATIONS,
};
pub use snapshot::{
    compute_config_hash, validate_snapshot, HistoryLog, JobSnapshot, SnapshotBuilder,
    StateSnapshot,
};
pub use stats::Statistics;

//! Domain models for the repair-queue simulator

pub mod draws;
pub mod event;
pub mod job;
pub mod queue_counts;
pub mod server;
pub mod state;

// Re-exports
pub use draws::{ArrivalDraw, CompletionDraw};
pub use event::{Event, EventKind};
pub use job::{Job, JobError, JobId, JobStatus, JobType};
pub use queue_counts::QueueCounts;
pub use server::{ServerOccupancy, ServerState};
pub use state::SimulationState;

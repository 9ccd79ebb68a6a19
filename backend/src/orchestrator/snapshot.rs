//! Snapshots - Frozen Rows of Simulation State
//!
//! One [`StateSnapshot`] is built after every processed event (plus the
//! initial "Start" row) and collected by the [`HistoryLog`].
//!
//! # Critical Invariants
//!
//! - **Ownership**: a snapshot owns copies of everything it shows; nothing
//!   done to the engine afterwards can change a stored row
//! - **Finished jobs once**: a departed job is listed in exactly one row, the
//!   one built right after its departure
//! - **Capacity accounting**: `free = capacity - common - background` in every
//!   row
//! - **Final row**: the last row produced is always the last row reported

use crate::models::{
    ArrivalDraw, CompletionDraw, Job, JobId, JobStatus, JobType, QueueCounts, ServerState,
    SimulationState,
};
use crate::orchestrator::config::ResolvedConfig;
use crate::orchestrator::SimulationError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

// ============================================================================
// Snapshot Structures
// ============================================================================

/// One immutable row of the simulation history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Position in the full history (the "Start" row is 0)
    pub step: usize,

    /// Event that produced this row, e.g. `"Arrival J3"`
    pub label: String,

    /// Simulated clock (hours)
    pub clock: f64,

    pub arrival: ArrivalDraw,

    pub counts: QueueCounts,

    /// Jobs admitted so far
    pub jobs_admitted: usize,

    /// Cumulative sojourn / admitted jobs (0 before any admission)
    pub mean_sojourn_time: f64,

    /// Busy time / clock × 100 (0 at time zero)
    pub utilization_pct: f64,

    pub completion: CompletionDraw,

    pub server: ServerState,

    /// Jobs in the system, plus any that departed at this step
    pub jobs: Vec<JobSnapshot>,
}

/// Job state captured in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub id: JobId,
    pub job_type: JobType,
    pub status: JobStatus,
    pub arrival_time: f64,
    pub completion_estimate: Option<f64>,
    pub switch_time: Option<f64>,
    pub resume_time: Option<f64>,
    pub departure_time: Option<f64>,
}

impl From<&Job> for JobSnapshot {
    fn from(job: &Job) -> Self {
        JobSnapshot {
            id: job.id(),
            job_type: job.job_type(),
            status: job.status(),
            arrival_time: job.arrival_time(),
            completion_estimate: job.completion_estimate(),
            switch_time: job.switch_time(),
            resume_time: job.resume_time(),
            departure_time: job.departure_time(),
        }
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Collects the per-step values the live state does not hold
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    step: usize,
    label: String,
    clock: f64,
    arrival: ArrivalDraw,
    completion: CompletionDraw,
    mean_sojourn_time: f64,
    utilization_pct: f64,
}

impl SnapshotBuilder {
    pub fn new(step: usize, label: impl Into<String>, clock: f64) -> Self {
        Self {
            step,
            label: label.into(),
            clock,
            arrival: ArrivalDraw::drawn(0.0, 0.0),
            completion: CompletionDraw::none(),
            mean_sojourn_time: 0.0,
            utilization_pct: 0.0,
        }
    }

    pub fn arrival(mut self, arrival: ArrivalDraw) -> Self {
        self.arrival = arrival;
        self
    }

    pub fn completion(mut self, completion: CompletionDraw) -> Self {
        self.completion = completion;
        self
    }

    pub fn running_stats(mut self, mean_sojourn_time: f64, utilization_pct: f64) -> Self {
        self.mean_sojourn_time = mean_sojourn_time;
        self.utilization_pct = utilization_pct;
        self
    }

    /// Freeze the current state into a row
    ///
    /// Finished jobs copied into this row are marked as reported, so later
    /// rows leave them out.
    pub fn build(self, state: &mut SimulationState) -> StateSnapshot {
        let jobs: Vec<JobSnapshot> = state.visible_jobs().map(JobSnapshot::from).collect();

        for job in state.jobs_mut() {
            if job.is_finished() && !job.is_reported_finished() {
                job.mark_reported_finished();
            }
        }

        StateSnapshot {
            step: self.step,
            label: self.label,
            clock: self.clock,
            arrival: self.arrival,
            counts: *state.counts(),
            jobs_admitted: state.jobs_admitted(),
            mean_sojourn_time: self.mean_sojourn_time,
            utilization_pct: self.utilization_pct,
            completion: self.completion,
            server: *state.server(),
            jobs,
        }
    }
}

// ============================================================================
// History
// ============================================================================

/// Full history of a run plus the rows selected for reporting
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryLog {
    reporting_start: f64,
    max_reported_rows: usize,
    full: Vec<StateSnapshot>,
    reported: Vec<StateSnapshot>,
}

impl HistoryLog {
    pub fn new(reporting_start: f64, max_reported_rows: usize) -> Self {
        Self {
            reporting_start,
            max_reported_rows,
            full: Vec::new(),
            reported: Vec::new(),
        }
    }

    /// Record a row; it is also reported while inside the window
    ///
    /// Returns whether the row was reported.
    pub fn offer(&mut self, snapshot: StateSnapshot) -> bool {
        let report =
            snapshot.clock >= self.reporting_start && self.reported.len() < self.max_reported_rows;
        if report {
            self.reported.push(snapshot.clone());
        }
        self.full.push(snapshot);
        report
    }

    /// Make sure the last row produced closes the report
    pub fn finish(&mut self) {
        let Some(last) = self.full.last() else {
            return;
        };
        if self.reported.last().map(|s| s.step) != Some(last.step) {
            self.reported.push(last.clone());
        }
    }

    /// Every row produced, in order
    pub fn full(&self) -> &[StateSnapshot] {
        &self.full
    }

    pub fn reported(&self) -> &[StateSnapshot] {
        &self.reported
    }

    pub fn latest(&self) -> Option<&StateSnapshot> {
        self.full.last()
    }

    pub fn len(&self) -> usize {
        self.full.len()
    }

    pub fn is_empty(&self) -> bool {
        self.full.is_empty()
    }

    /// Split into `(full, reported)`
    pub fn into_parts(self) -> (Vec<StateSnapshot>, Vec<StateSnapshot>) {
        (self.full, self.reported)
    }
}

// ============================================================================
// Config Hashing
// ============================================================================

/// Fingerprint of a resolved configuration (hex SHA-256)
///
/// Hashes the JSON form of the hour-unit parameters, so requests that
/// resolve to the same run share a fingerprint. Fields serialize in
/// declaration order.
pub fn compute_config_hash(config: &ResolvedConfig) -> Result<String, SimulationError> {
    let bytes = serde_json::to_vec(config)
        .map_err(|e| SimulationError::Serialization(format!("config hash: {}", e)))?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

// ============================================================================
// Validation
// ============================================================================

/// Validate snapshot integrity
///
/// Checks:
/// - queue counters add up to `capacity`
/// - listed job statuses agree with the counters
/// - at most one job holds the server, and only while it is Busy
/// - no job is listed twice
pub fn validate_snapshot(snapshot: &StateSnapshot, capacity: usize) -> Result<(), SimulationError> {
    let counts = &snapshot.counts;
    if !counts.is_consistent(capacity) {
        return Err(SimulationError::StateValidation(format!(
            "row {}: counters {:?} inconsistent with capacity {}",
            snapshot.step, counts, capacity
        )));
    }

    let count = |status: JobStatus| snapshot.jobs.iter().filter(|j| j.status == status).count();

    let waiting = count(JobStatus::Waiting);
    if waiting != counts.common {
        return Err(SimulationError::StateValidation(format!(
            "row {}: {} waiting jobs but common counter is {}",
            snapshot.step, waiting, counts.common
        )));
    }

    let queued = count(JobStatus::QueuedForC);
    if queued != counts.c_queue {
        return Err(SimulationError::StateValidation(format!(
            "row {}: {} jobs queued for resume but c_queue counter is {}",
            snapshot.step, queued, counts.c_queue
        )));
    }

    let off_server = count(JobStatus::Backgrounded) + queued;
    if off_server != counts.background {
        return Err(SimulationError::StateValidation(format!(
            "row {}: {} background jobs but background counter is {}",
            snapshot.step, off_server, counts.background
        )));
    }

    let in_service = count(JobStatus::InService);
    let expected = usize::from(snapshot.server.is_busy());
    if in_service != expected {
        return Err(SimulationError::StateValidation(format!(
            "row {}: {} jobs in service with server {:?}",
            snapshot.step, in_service, snapshot.server.occupancy
        )));
    }

    let mut seen = HashSet::new();
    for job in &snapshot.jobs {
        if !seen.insert(job.id) {
            return Err(SimulationError::StateValidation(format!(
                "row {}: job {} listed twice",
                snapshot.step, job.id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::config::SimulationConfig;

    fn start_row(state: &mut SimulationState) -> StateSnapshot {
        SnapshotBuilder::new(0, "Start", 0.0)
            .arrival(ArrivalDraw::drawn(0.3, 0.3))
            .build(state)
    }

    #[test]
    fn test_same_parameters_share_a_fingerprint() {
        let first = SimulationConfig::reference().resolve().unwrap();
        let second = SimulationConfig::reference().resolve().unwrap();

        let hash = compute_config_hash(&first).unwrap();
        assert_eq!(hash, compute_config_hash(&second).unwrap());
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_seed_alone_changes_the_fingerprint() {
        let base = SimulationConfig::reference();
        let reseeded = SimulationConfig {
            rng_seed: base.rng_seed + 1,
            ..base.clone()
        };

        assert_ne!(
            compute_config_hash(&base.resolve().unwrap()).unwrap(),
            compute_config_hash(&reseeded.resolve().unwrap()).unwrap()
        );
    }

    #[test]
    fn test_finished_job_listed_once() {
        let mut state = SimulationState::new(9);
        let id = state.admit_job(JobType::A, 0.0);
        state.job_mut(id).unwrap().start_service(0.5).unwrap();
        state.job_mut(id).unwrap().finish(0.5).unwrap();

        let first = SnapshotBuilder::new(1, "Complete J1", 0.5).build(&mut state);
        let second = SnapshotBuilder::new(2, "Arrival (rejected)", 0.6).build(&mut state);

        assert_eq!(first.jobs.len(), 1);
        assert_eq!(first.jobs[0].status, JobStatus::Finished);
        assert!(second.jobs.is_empty());
    }

    #[test]
    fn test_history_caps_reported_rows_and_keeps_final() {
        let mut state = SimulationState::new(9);
        let mut history = HistoryLog::new(0.0, 2);
        history.offer(start_row(&mut state));
        for step in 1..5 {
            let row = SnapshotBuilder::new(step, "Arrival (rejected)", step as f64).build(&mut state);
            history.offer(row);
        }
        history.finish();

        let steps: Vec<usize> = history.reported().iter().map(|s| s.step).collect();
        assert_eq!(steps, vec![0, 1, 4]);
        assert_eq!(history.full().len(), 5);
    }

    #[test]
    fn test_history_respects_reporting_start() {
        let mut state = SimulationState::new(9);
        let mut history = HistoryLog::new(1.0, 10);
        assert!(!history.offer(start_row(&mut state)));
        let row = SnapshotBuilder::new(1, "Arrival (rejected)", 1.0).build(&mut state);
        assert!(history.offer(row));
        history.finish();
        assert_eq!(history.reported().len(), 1);
    }

    #[test]
    fn test_validate_rejects_counter_mismatch() {
        let mut state = SimulationState::new(9);
        let id = state.admit_job(JobType::B, 0.0);
        state.enqueue_common(id);
        let mut row = start_row(&mut state);
        // server is free but a job waits: consistent counters, valid statuses
        assert!(validate_snapshot(&row, 9).is_ok());

        row.counts.common = 0;
        assert!(matches!(
            validate_snapshot(&row, 9),
            Err(SimulationError::StateValidation(_))
        ));
    }
}

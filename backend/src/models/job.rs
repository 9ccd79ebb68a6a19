//! Job model
//!
//! A job (an "equipo" brought in for repair) is admitted on arrival, moves
//! through the lifecycle below and is never deleted: finished jobs stay in the
//! registry so final statistics can read them.
//!
//! ```text
//! Waiting ──start_service──▶ InService ──finish──▶ Finished
//!                               │   ▲
//!             move_to_background│   │resume_on_server / start_remaining
//!                               ▼   │
//!                         Backgrounded ──queue_for_resume──▶ QueuedForC
//! ```
//!
//! Only type C jobs ever leave the server before finishing.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Monotonic job identifier (the first admitted job is 1)
pub type JobId = u32;

/// The four kinds of work the shop accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobType {
    A,
    B,
    C,
    D,
}

impl JobType {
    /// All job types, in configuration order
    pub const ALL: [JobType; 4] = [JobType::A, JobType::B, JobType::C, JobType::D];

    /// Position of this type in the per-type configuration arrays
    pub fn index(self) -> usize {
        match self {
            JobType::A => 0,
            JobType::B => 1,
            JobType::C => 2,
            JobType::D => 3,
        }
    }

    /// Whether jobs of this type are left running unattended mid-service
    pub fn has_background_phase(self) -> bool {
        matches!(self, JobType::C)
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobType::A => "A",
            JobType::B => "B",
            JobType::C => "C",
            JobType::D => "D",
        };
        f.write_str(name)
    }
}

/// Lifecycle state of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// In the common queue, never served yet
    Waiting,
    /// Holding the server
    InService,
    /// Backgrounded C job whose resume time came while the server was busy
    QueuedForC,
    /// C job running unattended
    Backgrounded,
    /// Departed
    Finished,
}

/// Errors raised by illegal lifecycle transitions
#[derive(Debug, Clone, Error, PartialEq)]
pub enum JobError {
    #[error("job {id}: cannot {action} while {status:?}")]
    InvalidTransition {
        id: JobId,
        action: &'static str,
        status: JobStatus,
    },
}

/// A unit of work in the system
///
/// # Example
/// ```
/// use repair_queue_simulator_core_rs::{Job, JobStatus, JobType};
///
/// let mut job = Job::new(1, JobType::A, 0.25);
/// assert_eq!(job.status(), JobStatus::Waiting);
///
/// job.start_service(0.75).unwrap();
/// let sojourn = job.finish(0.75).unwrap();
/// assert_eq!(sojourn, 0.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    id: JobId,
    job_type: JobType,
    status: JobStatus,
    arrival_time: f64,
    completion_estimate: Option<f64>,
    switch_time: Option<f64>,
    resume_time: Option<f64>,
    departure_time: Option<f64>,
    /// Set once the job has appeared as Finished in a snapshot
    reported_finished: bool,
}

impl Job {
    /// Create a job that waits for the server
    pub fn new(id: JobId, job_type: JobType, arrival_time: f64) -> Self {
        Self {
            id,
            job_type,
            status: JobStatus::Waiting,
            arrival_time,
            completion_estimate: None,
            switch_time: None,
            resume_time: None,
            departure_time: None,
            reported_finished: false,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn job_type(&self) -> JobType {
        self.job_type
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn arrival_time(&self) -> f64 {
        self.arrival_time
    }

    /// Time service is expected to end (absent while queued)
    pub fn completion_estimate(&self) -> Option<f64> {
        self.completion_estimate
    }

    /// Scheduled switch to background (type C, first phase only)
    pub fn switch_time(&self) -> Option<f64> {
        self.switch_time
    }

    /// Scheduled return to the server (type C, while backgrounded)
    pub fn resume_time(&self) -> Option<f64> {
        self.resume_time
    }

    pub fn departure_time(&self) -> Option<f64> {
        self.departure_time
    }

    pub fn is_finished(&self) -> bool {
        self.status == JobStatus::Finished
    }

    /// Time spent in the system, once departed
    pub fn sojourn_time(&self) -> Option<f64> {
        self.departure_time.map(|d| d - self.arrival_time)
    }

    /// Whether a snapshot has already shown this job as Finished
    pub fn is_reported_finished(&self) -> bool {
        self.reported_finished
    }

    pub(crate) fn mark_reported_finished(&mut self) {
        debug_assert!(self.is_finished(), "only finished jobs are retired from views");
        self.reported_finished = true;
    }

    fn invalid(&self, action: &'static str) -> JobError {
        JobError::InvalidTransition {
            id: self.id,
            action,
            status: self.status,
        }
    }

    /// Put a waiting job on the server with a freshly drawn completion time
    pub fn start_service(&mut self, completion: f64) -> Result<(), JobError> {
        if self.status != JobStatus::Waiting {
            return Err(self.invalid("start service"));
        }
        self.status = JobStatus::InService;
        self.completion_estimate = Some(completion);
        Ok(())
    }

    /// Record when an in-service C job will be left unattended
    pub fn schedule_switch(&mut self, at: f64) -> Result<(), JobError> {
        if self.status != JobStatus::InService || !self.job_type.has_background_phase() {
            return Err(self.invalid("schedule a background switch"));
        }
        self.switch_time = Some(at);
        Ok(())
    }

    /// Leave the server; the job must come back at `resume_at`
    pub fn move_to_background(&mut self, resume_at: f64) -> Result<(), JobError> {
        if self.status != JobStatus::InService {
            return Err(self.invalid("move to background"));
        }
        self.status = JobStatus::Backgrounded;
        self.switch_time = None;
        self.resume_time = Some(resume_at);
        Ok(())
    }

    /// The switch could not happen; the job stays on the server
    pub fn cancel_switch(&mut self) {
        self.switch_time = None;
    }

    /// Return to an idle server; the original completion estimate stands
    pub fn resume_on_server(&mut self) -> Result<(), JobError> {
        if self.status != JobStatus::Backgrounded {
            return Err(self.invalid("resume on server"));
        }
        self.status = JobStatus::InService;
        self.resume_time = None;
        Ok(())
    }

    /// Server was busy at resume time: wait in the C queue
    ///
    /// The completion estimate is dropped; a new one is set when the job
    /// finally gets the server back.
    pub fn queue_for_resume(&mut self) -> Result<(), JobError> {
        if self.status != JobStatus::Backgrounded {
            return Err(self.invalid("queue for resume"));
        }
        self.status = JobStatus::QueuedForC;
        self.resume_time = None;
        self.completion_estimate = None;
        Ok(())
    }

    /// Leave the C queue and finish the remaining attention on the server
    pub fn start_remaining(&mut self, completion: f64) -> Result<(), JobError> {
        if self.status != JobStatus::QueuedForC {
            return Err(self.invalid("start remaining service"));
        }
        self.status = JobStatus::InService;
        self.completion_estimate = Some(completion);
        Ok(())
    }

    /// Depart; returns the sojourn time
    pub fn finish(&mut self, departure: f64) -> Result<f64, JobError> {
        if self.status != JobStatus::InService {
            return Err(self.invalid("finish"));
        }
        self.status = JobStatus::Finished;
        self.departure_time = Some(departure);
        Ok(departure - self.arrival_time)
    }
}

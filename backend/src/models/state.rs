//! Simulation State
//!
//! Live, mutable state of one run: the job registry, both FIFO queues, the
//! queue counters and the server.
//!
//! # Critical Invariants
//!
//! 1. **Registry is append-only**: jobs are flagged Finished, never removed,
//!    and `index[id]` always points at the job with that id.
//! 2. **Queue membership matches status**: every id in `common_queue` is
//!    Waiting, every id in `c_queue` is QueuedForC.
//! 3. **Counters match queues**: `counts.common == common_queue.len()` and
//!    `counts.c_queue == c_queue.len()`.

use crate::models::job::{Job, JobId, JobStatus, JobType};
use crate::models::queue_counts::QueueCounts;
use crate::models::server::ServerState;
use std::collections::{HashMap, VecDeque};

/// Complete live state of a simulation run
///
/// # Example
///
/// ```rust
/// use repair_queue_simulator_core_rs::{JobType, SimulationState};
///
/// let mut state = SimulationState::new(9);
/// let id = state.admit_job(JobType::B, 0.3);
/// state.enqueue_common(id);
///
/// assert_eq!(state.jobs_admitted(), 1);
/// assert_eq!(state.counts().common, 1);
/// assert_eq!(state.counts().free, 8);
/// ```
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Every admitted job, in admission order
    jobs: Vec<Job>,

    /// Job id → position in `jobs`
    index: HashMap<JobId, usize>,

    /// Jobs waiting for first service (FIFO)
    common_queue: VecDeque<JobId>,

    /// Backgrounded C jobs waiting for the server to resume (FIFO)
    c_queue: VecDeque<JobId>,

    counts: QueueCounts,

    server: ServerState,

    capacity: usize,

    /// Jobs that departed
    jobs_completed: usize,
}

impl SimulationState {
    /// Empty system with `capacity` waiting slots and an idle server
    pub fn new(capacity: usize) -> Self {
        Self {
            jobs: Vec::new(),
            index: HashMap::new(),
            common_queue: VecDeque::new(),
            c_queue: VecDeque::new(),
            counts: QueueCounts::new(capacity),
            server: ServerState::default(),
            capacity,
            jobs_completed: 0,
        }
    }

    /// Create and register a new job; ids are consecutive from 1
    pub fn admit_job(&mut self, job_type: JobType, arrival_time: f64) -> JobId {
        let id = (self.jobs.len() + 1) as JobId;
        self.index.insert(id, self.jobs.len());
        self.jobs.push(Job::new(id, job_type, arrival_time));
        id
    }

    pub fn job(&self, id: JobId) -> Option<&Job> {
        self.index.get(&id).map(|&i| &self.jobs[i])
    }

    pub fn job_mut(&mut self, id: JobId) -> Option<&mut Job> {
        self.index.get(&id).map(|&i| &mut self.jobs[i])
    }

    /// All jobs ever admitted, finished ones included
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub(crate) fn jobs_mut(&mut self) -> &mut [Job] {
        &mut self.jobs
    }

    /// Total jobs admitted so far (rejected arrivals are not counted)
    pub fn jobs_admitted(&self) -> usize {
        self.jobs.len()
    }

    pub fn jobs_completed(&self) -> usize {
        self.jobs_completed
    }

    pub(crate) fn record_completion(&mut self, sojourn: f64) {
        self.jobs_completed += 1;
        self.server.accumulate_sojourn(sojourn);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn counts(&self) -> &QueueCounts {
        &self.counts
    }

    pub(crate) fn counts_mut(&mut self) -> &mut QueueCounts {
        &mut self.counts
    }

    pub fn server(&self) -> &ServerState {
        &self.server
    }

    pub(crate) fn server_mut(&mut self) -> &mut ServerState {
        &mut self.server
    }

    /// Ids waiting in the common queue, head first
    pub fn common_queue(&self) -> &VecDeque<JobId> {
        &self.common_queue
    }

    /// Ids waiting in the C-resume queue, head first
    pub fn c_queue(&self) -> &VecDeque<JobId> {
        &self.c_queue
    }

    /// Append a waiting job to the common queue and take a slot
    pub fn enqueue_common(&mut self, id: JobId) {
        debug_assert_eq!(
            self.job(id).map(|j| j.status()),
            Some(JobStatus::Waiting),
            "only waiting jobs join the common queue"
        );
        self.common_queue.push_back(id);
        self.counts.push_common();
    }

    /// Take the head of the common queue, releasing its slot
    pub fn pop_common(&mut self) -> Option<JobId> {
        let id = self.common_queue.pop_front()?;
        self.counts.pop_common();
        Some(id)
    }

    /// Append a backgrounded job to the C queue (it keeps its slot)
    pub fn enqueue_c(&mut self, id: JobId) {
        self.c_queue.push_back(id);
        self.counts.push_c_queue();
    }

    /// Take the head of the C queue, releasing its background slot
    pub fn pop_c(&mut self) -> Option<JobId> {
        let id = self.c_queue.pop_front()?;
        self.counts.pop_c_queue();
        Some(id)
    }

    /// Jobs that still belong in snapshot views
    ///
    /// A finished job is listed until a snapshot has shown it once.
    pub fn visible_jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter().filter(|j| !j.is_reported_finished())
    }

    /// Check the invariants listed in the module docs
    pub fn check_consistency(&self) -> Result<(), String> {
        if !self.counts.is_consistent(self.capacity) {
            return Err(format!("queue counters inconsistent: {:?}", self.counts));
        }
        if self.counts.common != self.common_queue.len() {
            return Err(format!(
                "common counter {} != queue length {}",
                self.counts.common,
                self.common_queue.len()
            ));
        }
        if self.counts.c_queue != self.c_queue.len() {
            return Err(format!(
                "c queue counter {} != queue length {}",
                self.counts.c_queue,
                self.c_queue.len()
            ));
        }
        for (queue, expected) in [
            (&self.common_queue, JobStatus::Waiting),
            (&self.c_queue, JobStatus::QueuedForC),
        ] {
            for id in queue {
                match self.job(*id) {
                    Some(job) if job.status() == expected => {}
                    Some(job) => {
                        return Err(format!(
                            "job {} queued as {:?} but is {:?}",
                            id,
                            expected,
                            job.status()
                        ))
                    }
                    None => return Err(format!("orphaned job id {} in queue", id)),
                }
            }
        }
        Ok(())
    }
}

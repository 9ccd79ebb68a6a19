//! Simulation Engine
//!
//! Event loop of the repair shop: one server, two FIFO queues (fresh jobs and
//! type C jobs waiting to resume) and a fixed number of waiting slots.
//!
//! # Architecture
//!
//! ```text
//! Start: draw first arrival, record "Start" row
//! While clock < horizon and iterations <= MAX_ITERATIONS:
//! 1. Pop the earliest event, advance the clock
//! 2. Charge the elapsed interval to the server if it was busy
//! 3. Dispatch: Arrival | SwitchToBackground | Resume | Complete
//! 4. Freeze the new state into a row and offer it to the history
//! Finish: close the report with the final row, compute statistics
//! ```
//!
//! When the server frees up it pulls work in priority order: the C resume
//! queue first, then the common queue.
//!
//! # Example
//!
//! ```rust
//! use repair_queue_simulator_core_rs::{Engine, SimulationConfig, Termination};
//!
//! let engine = Engine::new(&SimulationConfig::reference()).unwrap();
//! let result = engine.run().unwrap();
//!
//! assert_eq!(result.termination, Termination::HorizonReached);
//! assert_eq!(result.reported[0].label, "Start");
//! ```

use crate::core::time::SimClock;
use crate::models::{
    ArrivalDraw, CompletionDraw, Event, EventKind, Job, JobError, JobId, SimulationState,
};
use crate::orchestrator::config::{ResolvedConfig, SimulationConfig};
use crate::orchestrator::snapshot::{compute_config_hash, HistoryLog, SnapshotBuilder, StateSnapshot};
use crate::orchestrator::stats::{running_mean_sojourn, running_utilization_pct, Statistics};
use crate::rng::RngManager;
use crate::scheduler::EventScheduler;
use crate::variates::{ArrivalGenerator, ServiceTimeGenerator};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Hard cap on processed events per run
pub const MAX_ITERATIONS: usize = 100_000;

/// Simulation error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// Configuration rejected before the run started
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Nothing left to process below the horizon
    #[error("no pending events at clock {clock}")]
    EmptyScheduler { clock: f64 },

    /// An event referred to a job the registry does not hold
    #[error("unknown job {0}")]
    UnknownJob(JobId),

    #[error(transparent)]
    Job(#[from] JobError),

    /// Live state or a snapshot broke an invariant
    #[error("state validation failed: {0}")]
    StateValidation(String),

    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Why the event loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    HorizonReached,
    /// The iteration cap stopped the run first; results cover what was processed
    IterationCap,
}

/// Everything a finished run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub seed: u64,
    pub config_hash: String,
    pub termination: Termination,
    pub statistics: Statistics,
    /// Events processed
    pub iterations: usize,
    pub final_clock: f64,
    /// Rows inside the reporting window, closed by the final row
    pub reported: Vec<StateSnapshot>,
    /// Every row produced
    pub history: Vec<StateSnapshot>,
}

impl SimulationResult {
    pub fn total_reported_rows(&self) -> usize {
        self.reported.len()
    }

    pub fn final_snapshot(&self) -> Option<&StateSnapshot> {
        self.history.last()
    }
}

/// What a handler did, as shown in the row it produces
struct StepOutcome {
    label: String,
    arrival: ArrivalDraw,
    completion: CompletionDraw,
}

/// One simulation run
///
/// Owns every piece of mutable state; build a fresh engine per run.
///
/// # Determinism
///
/// All randomness comes from one seeded [`RngManager`]. Same config, same
/// rows.
#[derive(Debug)]
pub struct Engine {
    config: ResolvedConfig,
    config_hash: String,

    state: SimulationState,
    clock: SimClock,
    scheduler: EventScheduler,
    rng: RngManager,

    arrivals: ArrivalGenerator,
    service: ServiceTimeGenerator,

    history: HistoryLog,

    /// Draws shown in the previous row, carried when a step draws nothing
    last_arrival: ArrivalDraw,
    last_completion: CompletionDraw,

    iterations: usize,
}

impl Engine {
    /// Validate `config`, set up an empty shop and record the "Start" row
    ///
    /// # Errors
    ///
    /// `SimulationError::InvalidConfig` if the configuration is rejected.
    pub fn new(config: &SimulationConfig) -> Result<Self, SimulationError> {
        let resolved = config.resolve()?;
        let config_hash = compute_config_hash(&resolved)?;

        let mut engine = Self {
            state: SimulationState::new(resolved.capacity),
            clock: SimClock::new(),
            scheduler: EventScheduler::new(),
            rng: RngManager::new(resolved.rng_seed),
            arrivals: ArrivalGenerator::new(
                resolved.mean_interarrival,
                resolved.job_type_probabilities,
            ),
            service: ServiceTimeGenerator::new(
                resolved.mean_service_time,
                resolved.service_lower,
                resolved.service_upper,
            ),
            history: HistoryLog::new(resolved.reporting_start, resolved.max_reported_rows),
            last_arrival: ArrivalDraw::drawn(0.0, 0.0),
            last_completion: CompletionDraw::none(),
            iterations: 0,
            config: resolved,
            config_hash,
        };
        engine.start();
        Ok(engine)
    }

    fn start(&mut self) {
        let first = self.arrivals.next_arrival(0.0, &mut self.rng);
        self.scheduler.schedule(Event::arrival(first.next_arrival));

        info!(
            seed = self.config.rng_seed,
            horizon = self.config.horizon,
            capacity = self.config.capacity,
            config_hash = %self.config_hash,
            "simulation started"
        );

        self.record(StepOutcome {
            label: "Start".to_string(),
            arrival: first,
            completion: CompletionDraw::none(),
        });
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn config_hash(&self) -> &str {
        &self.config_hash
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Current simulated time (hours)
    pub fn clock(&self) -> f64 {
        self.clock.now()
    }

    pub fn scheduler(&self) -> &EventScheduler {
        &self.scheduler
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Whether the loop condition still holds
    pub fn is_running(&self) -> bool {
        self.clock.now() < self.config.horizon && self.iterations <= MAX_ITERATIONS
    }

    // ========================================================================
    // Main loop
    // ========================================================================

    /// Run to the horizon (or the iteration cap) and summarize
    pub fn run(mut self) -> Result<SimulationResult, SimulationError> {
        while self.step()?.is_some() {}
        Ok(self.finish())
    }

    /// Process one event
    ///
    /// Returns the row it produced, or `None` once the loop condition fails.
    pub fn step(&mut self) -> Result<Option<&StateSnapshot>, SimulationError> {
        if !self.is_running() {
            return Ok(None);
        }

        let event = self.scheduler.pop_next(self.clock.now())?;
        let was_busy = self.state.server().is_busy();
        self.clock.advance_to(event.time());
        if was_busy {
            let elapsed = self.clock.elapsed_since_previous();
            self.state.server_mut().accumulate_busy(elapsed);
        }
        self.iterations += 1;

        let outcome = match event.kind() {
            EventKind::Arrival => self.handle_arrival()?,
            EventKind::SwitchToBackground => self.handle_switch(job_of(&event)?)?,
            EventKind::Resume => self.handle_resume(job_of(&event)?)?,
            EventKind::Complete => self.handle_complete(job_of(&event)?)?,
        };

        debug!(
            clock = self.clock.now(),
            event = %event.kind(),
            job = ?event.job(),
            label = %outcome.label,
            counts = ?self.state.counts(),
            "event processed"
        );
        debug_assert_eq!(self.state.check_consistency(), Ok(()));

        self.record(outcome);
        Ok(self.history.latest())
    }

    /// Close the report and compute final statistics
    pub fn finish(mut self) -> SimulationResult {
        let final_clock = self.clock.now();
        let termination = if final_clock >= self.config.horizon {
            Termination::HorizonReached
        } else {
            warn!(
                iterations = self.iterations,
                clock = final_clock,
                horizon = self.config.horizon,
                "iteration cap reached before the horizon"
            );
            Termination::IterationCap
        };

        self.history.finish();
        let statistics = Statistics::collect(&self.state, final_clock);

        info!(
            iterations = self.iterations,
            clock = final_clock,
            jobs_admitted = statistics.jobs_admitted,
            jobs_completed = statistics.jobs_completed,
            mean_sojourn = ?statistics.mean_sojourn_time,
            utilization_pct = ?statistics.server_utilization_pct,
            reported_rows = self.history.reported().len(),
            "simulation finished"
        );

        let (history, reported) = self.history.into_parts();
        SimulationResult {
            seed: self.config.rng_seed,
            config_hash: self.config_hash,
            termination,
            statistics,
            iterations: self.iterations,
            final_clock,
            reported,
            history,
        }
    }

    fn record(&mut self, outcome: StepOutcome) {
        let now = self.clock.now();
        let snapshot = SnapshotBuilder::new(self.history.len(), outcome.label, now)
            .arrival(outcome.arrival)
            .completion(outcome.completion)
            .running_stats(
                running_mean_sojourn(&self.state),
                running_utilization_pct(&self.state, now),
            )
            .build(&mut self.state);

        self.last_arrival = outcome.arrival;
        self.last_completion = outcome.completion;
        self.history.offer(snapshot);
    }

    // ========================================================================
    // Handlers
    // ========================================================================

    fn handle_arrival(&mut self) -> Result<StepOutcome, SimulationError> {
        let now = self.clock.now();

        // exactly one arrival is pending at all times
        let mut arrival = self.arrivals.next_arrival(now, &mut self.rng);
        self.scheduler.schedule(Event::arrival(arrival.next_arrival));

        if self.state.server().is_busy() {
            if !self.state.counts().has_free_slot() {
                debug!(clock = now, "arrival rejected, no free slot");
                return Ok(StepOutcome {
                    label: "Arrival (rejected)".to_string(),
                    arrival,
                    completion: CompletionDraw::carried(&self.last_completion),
                });
            }

            let job_type = self.arrivals.draw_job_type(&mut self.rng);
            arrival.job_type = Some(job_type);
            let id = self.state.admit_job(job_type, now);
            self.state.enqueue_common(id);

            return Ok(StepOutcome {
                label: format!("Arrival J{}", id),
                arrival,
                completion: CompletionDraw::carried(&self.last_completion),
            });
        }

        let job_type = self.arrivals.draw_job_type(&mut self.rng);
        arrival.job_type = Some(job_type);
        let id = self.state.admit_job(job_type, now);
        let completion = self.start_fresh_service(id)?;

        Ok(StepOutcome {
            label: format!("Arrival J{}", id),
            arrival,
            completion,
        })
    }

    fn handle_switch(&mut self, id: JobId) -> Result<StepOutcome, SimulationError> {
        let now = self.clock.now();
        let label = format!("SwitchToBackground J{}", id);
        let arrival = ArrivalDraw::carried(&self.last_arrival);

        // Every slot holds a backgrounded job: attend it straight through
        let counts = *self.state.counts();
        if !counts.has_free_slot() && counts.common == 0 && counts.c_queue == 0 {
            self.job_mut(id)?.cancel_switch();
            debug!(job = id, clock = now, "switch declined, all slots backgrounded");
            return Ok(StepOutcome {
                label,
                arrival,
                completion: CompletionDraw::carried(&self.last_completion),
            });
        }

        let completion_at = self.job(id)?.completion_estimate().ok_or_else(|| {
            SimulationError::StateValidation(format!(
                "job {} switching without a completion estimate",
                id
            ))
        })?;
        let resume_at = (completion_at - self.config.c_resume_lead).max(now);

        // A full room frees the slot this job needs once the next job leaves its queue
        let room_full = !counts.has_free_slot();
        let pulled_first = if room_full {
            self.pull_next_work()?
        } else {
            None
        };

        self.job_mut(id)?.move_to_background(resume_at)?;
        self.state.counts_mut().move_to_background();

        // Re-queue Complete behind Resume so a zero lead keeps them in order
        self.scheduler.cancel(EventKind::Complete, id);
        self.scheduler
            .schedule(Event::for_job(EventKind::Resume, resume_at, id));
        self.scheduler
            .schedule(Event::for_job(EventKind::Complete, completion_at, id));

        let pulled = if room_full {
            pulled_first
        } else {
            self.pull_next_work()?
        };
        let completion = match pulled {
            Some(drawn) => drawn,
            None => CompletionDraw::carried(&self.last_completion),
        };

        Ok(StepOutcome {
            label,
            arrival,
            completion,
        })
    }

    fn handle_resume(&mut self, id: JobId) -> Result<StepOutcome, SimulationError> {
        let label = format!("Resume J{}", id);
        let arrival = ArrivalDraw::carried(&self.last_arrival);

        if self.state.server().is_busy() {
            self.job_mut(id)?.queue_for_resume()?;
            self.state.enqueue_c(id);
            // a new Complete is scheduled when the job gets the server back
            self.scheduler.cancel(EventKind::Complete, id);

            return Ok(StepOutcome {
                label,
                arrival,
                completion: CompletionDraw::carried(&self.last_completion),
            });
        }

        self.job_mut(id)?.resume_on_server()?;
        self.state.counts_mut().resume_from_background();
        self.state.server_mut().set_busy();

        Ok(StepOutcome {
            label,
            arrival,
            completion: CompletionDraw {
                service_time: None,
                completion_time: self.job(id)?.completion_estimate(),
            },
        })
    }

    fn handle_complete(&mut self, id: JobId) -> Result<StepOutcome, SimulationError> {
        let now = self.clock.now();
        let sojourn = self.job_mut(id)?.finish(now)?;
        self.state.record_completion(sojourn);

        let completion = self.pull_next_work()?.unwrap_or_else(CompletionDraw::none);

        Ok(StepOutcome {
            label: format!("Complete J{}", id),
            arrival: ArrivalDraw::carried(&self.last_arrival),
            completion,
        })
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Give the idle server its next job, C resume queue first
    ///
    /// Returns the completion draw of the job taken, or `None` if both queues
    /// were empty and the server went idle.
    fn pull_next_work(&mut self) -> Result<Option<CompletionDraw>, SimulationError> {
        let now = self.clock.now();

        if let Some(id) = self.state.pop_c() {
            let lead = self.config.c_resume_lead;
            self.job_mut(id)?.start_remaining(now + lead)?;
            self.state.server_mut().set_busy();
            self.scheduler
                .schedule(Event::for_job(EventKind::Complete, now + lead, id));
            return Ok(Some(CompletionDraw::drawn(lead, now + lead)));
        }

        if let Some(id) = self.state.pop_common() {
            return self.start_fresh_service(id).map(Some);
        }

        self.state.server_mut().set_free();
        Ok(None)
    }

    /// Put a waiting job on the server with a freshly drawn service time
    fn start_fresh_service(&mut self, id: JobId) -> Result<CompletionDraw, SimulationError> {
        let now = self.clock.now();
        let job_type = self.job(id)?.job_type();
        let service_time = self.service.draw(job_type, &mut self.rng);
        let completion_at = now + service_time;

        // too short to leave unattended: Resume would come before the switch
        let switch_at = now + self.config.c_background_delay;
        let needs_switch = job_type.has_background_phase()
            && service_time > self.config.c_background_delay + self.config.c_resume_lead;

        {
            let job = self.job_mut(id)?;
            job.start_service(completion_at)?;
            if needs_switch {
                job.schedule_switch(switch_at)?;
            }
        }
        self.state.server_mut().set_busy();

        self.scheduler
            .schedule(Event::for_job(EventKind::Complete, completion_at, id));
        if needs_switch {
            self.scheduler
                .schedule(Event::for_job(EventKind::SwitchToBackground, switch_at, id));
        }

        Ok(CompletionDraw::drawn(service_time, completion_at))
    }

    fn job(&self, id: JobId) -> Result<&Job, SimulationError> {
        self.state.job(id).ok_or(SimulationError::UnknownJob(id))
    }

    fn job_mut(&mut self, id: JobId) -> Result<&mut Job, SimulationError> {
        self.state.job_mut(id).ok_or(SimulationError::UnknownJob(id))
    }
}

/// Job an event refers to; only arrivals carry none
fn job_of(event: &Event) -> Result<JobId, SimulationError> {
    event.job().ok_or_else(|| {
        SimulationError::StateValidation(format!(
            "{} event at {} without a job",
            event.kind(),
            event.time()
        ))
    })
}

/// Build an engine for `config` and run it to the end
pub fn run_simulation(config: &SimulationConfig) -> Result<SimulationResult, SimulationError> {
    Engine::new(config)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JobStatus, JobType, QueueCounts};

    const LEAD: f64 = 10.0 / 60.0;

    /// Deterministic services and arrivals placed by hand
    fn quiet_engine(probabilities: [f64; 4], capacity: usize, lead_minutes: f64) -> Engine {
        let config = SimulationConfig {
            simulation_horizon: 1e12,
            job_type_probabilities: probabilities,
            mean_service_time: [1.0, 0.6, 1.0, 0.8],
            service_time_uniform_bounds: [0.0, 0.0],
            c_background_delay_minutes: 30.0,
            c_resume_lead_minutes: lead_minutes,
            reporting_start_time: 0.0,
            max_reported_rows: 1_000,
            mean_interarrival_hours: 1e9,
            capacity,
            rng_seed: 7,
        };
        let mut engine = Engine::new(&config).unwrap();
        engine.scheduler.clear();
        engine
    }

    fn step_label(engine: &mut Engine) -> String {
        engine.step().unwrap().unwrap().label.clone()
    }

    fn status(engine: &Engine, id: JobId) -> JobStatus {
        engine.state().job(id).unwrap().status()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_type_c_job_on_idle_server_runs_both_phases() {
        let mut engine = quiet_engine([0.0, 0.0, 1.0, 0.0], 9, 10.0);
        engine.scheduler.schedule(Event::arrival(0.0));

        assert_eq!(step_label(&mut engine), "Arrival J1");
        let job = engine.state().job(1).unwrap();
        assert_eq!(job.job_type(), JobType::C);
        assert_eq!(job.switch_time(), Some(0.5));
        assert_close(job.completion_estimate().unwrap(), 1.0);

        assert_eq!(step_label(&mut engine), "SwitchToBackground J1");
        assert_eq!(status(&engine, 1), JobStatus::Backgrounded);
        assert_eq!(engine.state().counts().background, 1);
        assert_eq!(engine.state().counts().free, 8);
        assert!(!engine.state().server().is_busy());
        assert_close(engine.state().job(1).unwrap().resume_time().unwrap(), 1.0 - LEAD);

        assert_eq!(step_label(&mut engine), "Resume J1");
        assert_eq!(status(&engine, 1), JobStatus::InService);
        assert_eq!(engine.state().counts().background, 0);
        assert_eq!(engine.state().counts().free, 9);

        let row = engine.step().unwrap().unwrap().clone();
        assert_eq!(row.label, "Complete J1");
        assert_close(row.clock, 1.0);
        assert_eq!(row.jobs.len(), 1);
        assert_eq!(row.jobs[0].status, JobStatus::Finished);
        assert!(!row.server.is_busy());
        // busy while attended: [0, 0.5] and [1 - lead, 1]
        assert_close(row.server.busy_time, 0.5 + LEAD);
        assert_close(row.server.sojourn_time, 1.0);
    }

    #[test]
    fn test_resume_queue_has_priority_over_common_queue() {
        let mut engine = quiet_engine([0.0, 0.0, 1.0, 0.0], 9, 10.0);
        for t in [0.0, 0.1, 0.6] {
            engine.scheduler.schedule(Event::arrival(t));
        }

        assert_eq!(step_label(&mut engine), "Arrival J1");
        assert_eq!(step_label(&mut engine), "Arrival J2");
        assert_eq!(status(&engine, 2), JobStatus::Waiting);

        // J1 leaves the server, J2 is pulled from the common queue
        assert_eq!(step_label(&mut engine), "SwitchToBackground J1");
        assert_eq!(status(&engine, 2), JobStatus::InService);

        assert_eq!(step_label(&mut engine), "Arrival J3");

        // server busy with J2: J1 must wait and loses its Complete
        assert_eq!(step_label(&mut engine), "Resume J1");
        assert_eq!(status(&engine, 1), JobStatus::QueuedForC);
        assert!(!engine.scheduler().is_pending(EventKind::Complete, 1));
        assert_eq!(engine.state().counts().c_queue, 1);
        assert_eq!(engine.state().counts().background, 1);

        // J2 switches out: J1 goes before J3
        let row = engine.step().unwrap().unwrap().clone();
        assert_eq!(row.label, "SwitchToBackground J2");
        assert_eq!(status(&engine, 1), JobStatus::InService);
        assert_eq!(status(&engine, 3), JobStatus::Waiting);
        assert_eq!(row.completion.service_time, Some(10.0 / 60.0));
        assert_close(row.completion.completion_time.unwrap(), 1.0 + LEAD);
        assert_eq!(row.counts.c_queue, 0);
        assert_eq!(row.counts.background, 1);
        assert_eq!(row.counts.common, 1);

        assert_eq!(step_label(&mut engine), "Complete J1");
        assert_eq!(status(&engine, 3), JobStatus::InService);
    }

    #[test]
    fn test_arrival_rejected_when_no_slot_is_free() {
        let mut engine = quiet_engine([1.0, 0.0, 0.0, 0.0], 1, 10.0);
        for t in [0.0, 0.1, 0.2] {
            engine.scheduler.schedule(Event::arrival(t));
        }

        assert_eq!(step_label(&mut engine), "Arrival J1");
        assert_eq!(step_label(&mut engine), "Arrival J2");

        let row = engine.step().unwrap().unwrap().clone();
        assert_eq!(row.label, "Arrival (rejected)");
        assert_eq!(row.jobs_admitted, 2);
        assert_eq!(row.arrival.job_type, None);
        assert!(engine.state().job(3).is_none());

        assert_eq!(step_label(&mut engine), "Complete J1");
        assert_eq!(status(&engine, 2), JobStatus::InService);
    }

    #[test]
    fn test_switch_in_full_room_swaps_with_waiting_job() {
        let mut engine = quiet_engine([0.0, 0.0, 1.0, 0.0], 1, 10.0);
        engine.scheduler.schedule(Event::arrival(0.0));
        engine.scheduler.schedule(Event::arrival(0.1));

        step_label(&mut engine);
        step_label(&mut engine);
        assert_eq!(engine.state().counts().free, 0);

        // J2 leaves the common queue, J1 takes the slot it frees
        let row = engine.step().unwrap().unwrap().clone();
        assert_eq!(row.label, "SwitchToBackground J1");
        assert_eq!(status(&engine, 1), JobStatus::Backgrounded);
        assert_eq!(status(&engine, 2), JobStatus::InService);
        assert_eq!(
            row.counts,
            QueueCounts {
                common: 0,
                c_queue: 0,
                background: 1,
                free: 0
            }
        );
        assert_close(row.completion.completion_time.unwrap(), 1.5);

        assert_eq!(step_label(&mut engine), "Resume J1");
        assert_eq!(status(&engine, 1), JobStatus::QueuedForC);

        // J2 switches while J1 waits in the C queue: J1 hands its slot to J2
        let row = engine.step().unwrap().unwrap().clone();
        assert_eq!(row.label, "SwitchToBackground J2");
        assert_eq!(status(&engine, 1), JobStatus::InService);
        assert_eq!(status(&engine, 2), JobStatus::Backgrounded);
        assert_eq!(row.counts.background, 1);
        assert_eq!(row.counts.c_queue, 0);
        assert_eq!(row.counts.free, 0);
        assert_close(row.completion.completion_time.unwrap(), 1.0 + LEAD);

        assert_eq!(step_label(&mut engine), "Complete J1");
        assert_eq!(step_label(&mut engine), "Resume J2");
        assert_eq!(step_label(&mut engine), "Complete J2");
        assert_close(engine.clock(), 1.5);
    }

    #[test]
    fn test_switch_declined_when_every_slot_is_backgrounded() {
        let config = SimulationConfig {
            simulation_horizon: 1e12,
            job_type_probabilities: [0.0, 0.0, 1.0, 0.0],
            mean_service_time: [0.5, 0.6, 3.0, 0.8],
            service_time_uniform_bounds: [0.0, 0.0],
            mean_interarrival_hours: 1e9,
            capacity: 1,
            ..SimulationConfig::reference()
        };
        let mut engine = Engine::new(&config).unwrap();
        engine.scheduler.clear();
        engine.scheduler.schedule(Event::arrival(0.0));
        engine.scheduler.schedule(Event::arrival(0.6));

        assert_eq!(step_label(&mut engine), "Arrival J1");
        assert_eq!(step_label(&mut engine), "SwitchToBackground J1");
        assert_eq!(step_label(&mut engine), "Arrival J2");
        assert_eq!(status(&engine, 2), JobStatus::InService);

        // J1 holds the only slot and both queues are empty
        assert_eq!(step_label(&mut engine), "SwitchToBackground J2");
        let job = engine.state().job(2).unwrap();
        assert_eq!(job.status(), JobStatus::InService);
        assert_eq!(job.switch_time(), None);
        assert!(!engine.scheduler().is_pending(EventKind::Resume, 2));
        assert_eq!(engine.state().counts().background, 1);

        // J1 finds the server busy and waits for J2 to finish
        assert_eq!(step_label(&mut engine), "Resume J1");
        assert_eq!(status(&engine, 1), JobStatus::QueuedForC);

        let row = engine.step().unwrap().unwrap().clone();
        assert_eq!(row.label, "Complete J2");
        assert_close(row.clock, 3.6);
        assert_eq!(status(&engine, 1), JobStatus::InService);
        assert_close(row.completion.completion_time.unwrap(), 3.6 + LEAD);
    }

    #[test]
    fn test_completion_hands_server_to_c_queue_before_common_queue() {
        let mut engine = quiet_engine([0.0, 0.0, 1.0, 0.0], 9, 10.0);
        for t in [0.0, 0.1, 0.2] {
            engine.scheduler.schedule(Event::arrival(t));
        }

        assert_eq!(step_label(&mut engine), "Arrival J1");
        // later jobs are type A: no switch of their own
        engine.arrivals = ArrivalGenerator::new(1e9, [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(step_label(&mut engine), "Arrival J2");
        assert_eq!(step_label(&mut engine), "Arrival J3");

        assert_eq!(step_label(&mut engine), "SwitchToBackground J1");
        assert_eq!(status(&engine, 2), JobStatus::InService);
        assert_eq!(step_label(&mut engine), "Resume J1");
        assert_eq!(status(&engine, 1), JobStatus::QueuedForC);

        // both queues hold a job when J2 departs
        assert_eq!(engine.state().counts().c_queue, 1);
        assert_eq!(engine.state().counts().common, 1);

        let row = engine.step().unwrap().unwrap().clone();
        assert_eq!(row.label, "Complete J2");
        assert_close(row.clock, 1.5);
        assert_eq!(status(&engine, 1), JobStatus::InService);
        assert_eq!(status(&engine, 3), JobStatus::Waiting);
        assert_eq!(row.completion.service_time, Some(10.0 / 60.0));
        assert_close(row.completion.completion_time.unwrap(), 1.5 + LEAD);
        assert_eq!(row.counts.c_queue, 0);
        assert_eq!(row.counts.background, 0);
        assert_eq!(row.counts.common, 1);

        assert_eq!(step_label(&mut engine), "Complete J1");
        assert_eq!(status(&engine, 3), JobStatus::InService);
    }

    #[test]
    fn test_zero_lead_resumes_before_completing() {
        let mut engine = quiet_engine([0.0, 0.0, 1.0, 0.0], 9, 0.0);
        engine.scheduler.schedule(Event::arrival(0.0));

        let labels: Vec<String> = (0..4).map(|_| step_label(&mut engine)).collect();
        assert_eq!(
            labels,
            vec!["Arrival J1", "SwitchToBackground J1", "Resume J1", "Complete J1"]
        );
        assert_eq!(status(&engine, 1), JobStatus::Finished);
    }

    #[test]
    fn test_short_type_c_job_is_served_straight_through() {
        let config = SimulationConfig {
            mean_service_time: [0.5, 0.6, 0.5, 0.8],
            service_time_uniform_bounds: [0.0, 0.0],
            job_type_probabilities: [0.0, 0.0, 1.0, 0.0],
            mean_interarrival_hours: 1e9,
            simulation_horizon: 1e12,
            ..SimulationConfig::reference()
        };
        let mut engine = Engine::new(&config).unwrap();
        engine.scheduler.clear();
        engine.scheduler.schedule(Event::arrival(0.0));

        assert_eq!(step_label(&mut engine), "Arrival J1");
        assert_eq!(engine.state().job(1).unwrap().switch_time(), None);
        assert!(!engine
            .scheduler()
            .is_pending(EventKind::SwitchToBackground, 1));
        assert_eq!(step_label(&mut engine), "Complete J1");
    }

    #[test]
    fn test_empty_scheduler_is_fatal() {
        let mut engine = quiet_engine([0.25; 4], 9, 10.0);
        assert_eq!(
            engine.step().unwrap_err(),
            SimulationError::EmptyScheduler { clock: 0.0 }
        );
    }

    #[test]
    fn test_iteration_cap_ends_run_without_error() {
        let config = SimulationConfig {
            simulation_horizon: 1e9,
            mean_interarrival_hours: 1e-3,
            capacity: 1,
            max_reported_rows: 10,
            ..SimulationConfig::reference()
        };
        let result = run_simulation(&config).unwrap();

        assert_eq!(result.termination, Termination::IterationCap);
        assert_eq!(result.iterations, MAX_ITERATIONS + 1);
        assert_eq!(result.total_reported_rows(), 11);
        assert_eq!(
            result.reported.last().map(|s| s.step),
            result.final_snapshot().map(|s| s.step)
        );
    }

    #[test]
    fn test_invalid_config_rejected_before_running() {
        let config = SimulationConfig {
            simulation_horizon: 0.0,
            ..SimulationConfig::reference()
        };
        assert!(matches!(
            Engine::new(&config),
            Err(SimulationError::InvalidConfig(_))
        ));
    }
}

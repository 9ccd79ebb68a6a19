//! End-to-end scenarios for the simulation engine

use repair_queue_simulator_core_rs::{
    run_simulation, JobStatus, SimulationConfig, SimulationResult, Termination,
};
use std::collections::HashSet;

fn reference_run(seed: u64) -> SimulationResult {
    run_simulation(&SimulationConfig {
        rng_seed: seed,
        ..SimulationConfig::reference()
    })
    .unwrap()
}

#[test]
fn test_reference_day() {
    let result = reference_run(12345);

    assert_eq!(result.termination, Termination::HorizonReached);
    assert!(result.total_reported_rows() >= 1);
    assert!(result.total_reported_rows() <= 51);

    let first = &result.reported[0];
    assert_eq!(first.label, "Start");
    assert_eq!(first.clock, 0.0);
    assert_eq!(first.jobs_admitted, 0);
    assert!(first.jobs.is_empty());
    assert!(!first.server.is_busy());
    assert_eq!(first.counts.free, 9);

    // every row but the one that crossed the horizon lies inside it
    let (last, earlier) = result.history.split_last().unwrap();
    assert!(last.clock >= 8.0);
    assert!(earlier.iter().all(|row| row.clock < 8.0));
    assert_eq!(result.reported.last(), Some(last));

    let utilization = result.statistics.server_utilization_pct.unwrap();
    assert!(utilization > 0.0 && utilization < 100.0, "{}", utilization);
    assert!(result.statistics.mean_sojourn_time.unwrap() > 0.0);
}

#[test]
fn test_statistics_bounds_hold_across_seeds() {
    for seed in 1..=25 {
        let result = reference_run(seed);
        let stats = &result.statistics;
        if stats.jobs_completed == 0 {
            assert_eq!(stats.mean_sojourn_time, None);
            assert_eq!(stats.server_utilization_pct, None);
            continue;
        }
        let utilization = stats.server_utilization_pct.unwrap();
        assert!((0.0..=100.0).contains(&utilization), "seed {}: {}", seed, utilization);
        assert!(stats.mean_sojourn_time.unwrap() >= 0.0);
        assert!(stats.jobs_completed <= stats.jobs_admitted);
    }
}

#[test]
fn test_labels_follow_event_vocabulary() {
    let result = reference_run(4242);
    for row in &result.history[1..] {
        let ok = row.label == "Arrival (rejected)"
            || ["Arrival J", "SwitchToBackground J", "Resume J", "Complete J"]
                .iter()
                .any(|prefix| {
                    row.label
                        .strip_prefix(prefix)
                        .map_or(false, |id| id.parse::<u32>().is_ok())
                });
        assert!(ok, "unexpected label {:?}", row.label);
    }
}

#[test]
fn test_jobs_start_service_in_admission_order() {
    let result = run_simulation(&SimulationConfig {
        simulation_horizon: 40.0,
        rng_seed: 31,
        ..SimulationConfig::reference()
    })
    .unwrap();

    let mut started = Vec::new();
    let mut seen = HashSet::new();
    for row in &result.history {
        for job in &row.jobs {
            if job.status != JobStatus::Waiting && seen.insert(job.id) {
                started.push(job.id);
            }
        }
    }

    assert!(started.len() > 10);
    let mut sorted = started.clone();
    sorted.sort_unstable();
    assert_eq!(started, sorted);
}

#[test]
fn test_without_type_c_jobs_complete_in_arrival_order() {
    let result = run_simulation(&SimulationConfig {
        simulation_horizon: 40.0,
        job_type_probabilities: [0.5, 0.3, 0.0, 0.2],
        rng_seed: 5,
        ..SimulationConfig::reference()
    })
    .unwrap();

    let completed: Vec<u32> = result
        .history
        .iter()
        .filter_map(|row| row.label.strip_prefix("Complete J"))
        .map(|id| id.parse().unwrap())
        .collect();

    assert!(completed.len() > 10);
    assert!(completed.windows(2).all(|w| w[0] < w[1]), "{:?}", completed);
    assert!(result
        .history
        .iter()
        .all(|row| row.counts.background == 0 && row.counts.c_queue == 0));
}

#[test]
fn test_rejected_arrivals_leave_no_trace() {
    let result = run_simulation(&SimulationConfig {
        capacity: 1,
        mean_interarrival_hours: 0.1,
        rng_seed: 8,
        ..SimulationConfig::reference()
    })
    .unwrap();

    let mut rejections = 0;
    for pair in result.history.windows(2) {
        let (before, row) = (&pair[0], &pair[1]);
        if row.label != "Arrival (rejected)" {
            continue;
        }
        rejections += 1;
        assert!(before.server.is_busy());
        assert_eq!(before.counts.free, 0);
        assert_eq!(row.jobs_admitted, before.jobs_admitted);
        assert_eq!(row.jobs.len(), before.jobs.iter().filter(|j| j.status != JobStatus::Finished).count());
        assert_eq!(row.arrival.job_type, None);
    }
    assert!(rejections > 0, "capacity 1 with frequent arrivals should reject");

    // admitted ids are consecutive: nothing was created for rejected arrivals
    let max_id = result
        .history
        .iter()
        .flat_map(|row| row.jobs.iter().map(|j| j.id))
        .max()
        .unwrap();
    assert_eq!(max_id as usize, result.statistics.jobs_admitted);
}

#[test]
fn test_type_c_resume_waits_behind_busy_server() {
    // heavy C load: some resumes must find the server busy
    let result = run_simulation(&SimulationConfig {
        simulation_horizon: 60.0,
        job_type_probabilities: [0.2, 0.0, 0.8, 0.0],
        mean_service_time: [0.5, 0.6, 2.0, 0.8],
        rng_seed: 17,
        ..SimulationConfig::reference()
    })
    .unwrap();

    let queued_rows = result
        .history
        .iter()
        .filter(|row| row.counts.c_queue > 0)
        .count();
    assert!(queued_rows > 0);

    for row in &result.history {
        assert!(row.counts.c_queue <= row.counts.background);
    }
}

#[test]
fn test_reporting_window_skips_early_rows() {
    let result = run_simulation(&SimulationConfig {
        reporting_start_time: 4.0,
        max_reported_rows: 5,
        rng_seed: 3,
        ..SimulationConfig::reference()
    })
    .unwrap();

    assert!(result.total_reported_rows() <= 6);
    assert!(result.reported.iter().all(|row| row.clock >= 4.0));
    assert_eq!(result.reported.last(), result.final_snapshot());
}

#[test]
fn test_zero_row_cap_still_reports_final_row() {
    let result = run_simulation(&SimulationConfig {
        max_reported_rows: 0,
        ..SimulationConfig::reference()
    })
    .unwrap();

    assert_eq!(result.total_reported_rows(), 1);
    assert_eq!(result.reported.last(), result.final_snapshot());
}

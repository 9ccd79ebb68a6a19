//! Type conversion utilities for FFI boundary
//!
//! Converts between Rust records and Python dicts/lists.

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::models::{ArrivalDraw, CompletionDraw, JobStatus};
use crate::orchestrator::{JobSnapshot, StateSnapshot};
use crate::service::{SimulationRequest, SimulationResponse};

// ========================================================================
// PyDict Extraction Helpers
// ========================================================================

/// Extract a required field, naming it in the error
fn extract_required<T>(dict: &Bound<'_, PyDict>, key: &str) -> PyResult<T>
where
    T: for<'py> FromPyObject<'py>,
{
    dict.get_item(key)?
        .ok_or_else(|| {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
                "Missing required field '{}'",
                key
            ))
        })?
        .extract()
}

/// Extract an optional field; `None` values count as missing
fn extract_optional<T>(dict: &Bound<'_, PyDict>, key: &str) -> PyResult<Option<T>>
where
    T: for<'py> FromPyObject<'py>,
{
    match dict.get_item(key)? {
        Some(value) if !value.is_none() => Ok(Some(value.extract()?)),
        _ => Ok(None),
    }
}

// ========================================================================
// Request Parser
// ========================================================================

/// Convert a Python dict to a SimulationRequest
///
/// Range checks happen later, in configuration validation.
pub fn parse_simulation_request(py_config: &Bound<'_, PyDict>) -> PyResult<SimulationRequest> {
    Ok(SimulationRequest {
        simulation_horizon: extract_required(py_config, "simulation_horizon")?,
        job_type_probabilities: extract_required(py_config, "job_type_probabilities")?,
        mean_service_time: extract_required(py_config, "mean_service_time")?,
        service_time_uniform_bounds: extract_required(py_config, "service_time_uniform_bounds")?,
        c_background_delay_minutes: extract_required(py_config, "c_background_delay_minutes")?,
        c_resume_lead_minutes: extract_required(py_config, "c_resume_lead_minutes")?,
        reporting_start_time: extract_required(py_config, "reporting_start_time")?,
        max_reported_rows: extract_required(py_config, "max_reported_rows")?,
        mean_interarrival_hours: extract_optional(py_config, "mean_interarrival_hours")?,
        capacity: extract_optional(py_config, "capacity")?,
        seed: extract_optional(py_config, "seed")?,
    })
}

// ========================================================================
// Result Converters
// ========================================================================

fn status_name(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Waiting => "waiting",
        JobStatus::InService => "in_service",
        JobStatus::QueuedForC => "queued_for_c",
        JobStatus::Backgrounded => "backgrounded",
        JobStatus::Finished => "finished",
    }
}

fn job_to_py<'py>(py: Python<'py>, job: &JobSnapshot) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("id", job.id)?;
    dict.set_item("job_type", job.job_type.to_string())?;
    dict.set_item("status", status_name(job.status))?;
    dict.set_item("arrival_time", job.arrival_time)?;
    dict.set_item("completion_estimate", job.completion_estimate)?;
    dict.set_item("switch_time", job.switch_time)?;
    dict.set_item("resume_time", job.resume_time)?;
    dict.set_item("departure_time", job.departure_time)?;
    Ok(dict)
}

fn arrival_to_py<'py>(py: Python<'py>, arrival: &ArrivalDraw) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("interarrival", arrival.interarrival)?;
    dict.set_item("next_arrival", arrival.next_arrival)?;
    dict.set_item("job_type", arrival.job_type.map(|t| t.to_string()))?;
    Ok(dict)
}

fn completion_to_py<'py>(
    py: Python<'py>,
    completion: &CompletionDraw,
) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("service_time", completion.service_time)?;
    dict.set_item("completion_time", completion.completion_time)?;
    Ok(dict)
}

/// Convert one history row to a Python dict
pub fn snapshot_to_py<'py>(
    py: Python<'py>,
    snapshot: &StateSnapshot,
) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);

    dict.set_item("step", snapshot.step)?;
    dict.set_item("label", snapshot.label.as_str())?;
    dict.set_item("clock", snapshot.clock)?;
    dict.set_item("arrival", arrival_to_py(py, &snapshot.arrival)?)?;

    let counts = PyDict::new(py);
    counts.set_item("common", snapshot.counts.common)?;
    counts.set_item("c_queue", snapshot.counts.c_queue)?;
    counts.set_item("background", snapshot.counts.background)?;
    counts.set_item("free", snapshot.counts.free)?;
    dict.set_item("counts", counts)?;

    dict.set_item("jobs_admitted", snapshot.jobs_admitted)?;
    dict.set_item("mean_sojourn_time", snapshot.mean_sojourn_time)?;
    dict.set_item("utilization_pct", snapshot.utilization_pct)?;
    dict.set_item("completion", completion_to_py(py, &snapshot.completion)?)?;

    let server = PyDict::new(py);
    server.set_item("busy", snapshot.server.is_busy())?;
    server.set_item("busy_time", snapshot.server.busy_time)?;
    server.set_item("sojourn_time", snapshot.server.sojourn_time)?;
    dict.set_item("server", server)?;

    dict.set_item("jobs", snapshots_list(py, snapshot.jobs.iter(), job_to_py)?)?;

    Ok(dict)
}

fn snapshots_list<'py, 'a, T: 'a>(
    py: Python<'py>,
    items: impl Iterator<Item = &'a T>,
    convert: impl Fn(Python<'py>, &T) -> PyResult<Bound<'py, PyDict>>,
) -> PyResult<Bound<'py, PyList>> {
    let list = PyList::empty(py);
    for item in items {
        list.append(convert(py, item)?)?;
    }
    Ok(list)
}

/// Convert a list of history rows
pub fn rows_to_py<'py>(py: Python<'py>, rows: &[StateSnapshot]) -> PyResult<Bound<'py, PyList>> {
    snapshots_list(py, rows.iter(), snapshot_to_py)
}

/// Convert a SimulationResponse to a Python dict
pub fn response_to_py(py: Python<'_>, response: &SimulationResponse) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new(py);

    dict.set_item("run_id", response.run_id.as_str())?;
    dict.set_item("seed", response.seed)?;
    dict.set_item("config_hash", response.config_hash.as_str())?;
    dict.set_item("mean_sojourn_time", response.mean_sojourn_time)?;
    dict.set_item("server_utilization_pct", response.server_utilization_pct)?;
    dict.set_item("total_reported_rows", response.total_reported_rows)?;
    dict.set_item(
        "reported_snapshots",
        rows_to_py(py, &response.reported_snapshots)?,
    )?;
    dict.set_item(
        "termination",
        match response.termination {
            crate::orchestrator::Termination::HorizonReached => "horizon_reached",
            crate::orchestrator::Termination::IterationCap => "iteration_cap",
        },
    )?;

    Ok(dict.into())
}

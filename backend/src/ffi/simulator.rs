//! PyO3 wrapper for the simulation service

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use super::types::{parse_simulation_request, response_to_py, rows_to_py};
use crate::orchestrator::SimulationError;
use crate::service::{ServiceError, SimulationService};

/// Python entry point
///
/// # Example (from Python)
///
/// ```python
/// from repair_queue_simulator_core_rs import Simulator
///
/// sim = Simulator()
/// result = sim.run({
///     "simulation_horizon": 8.0,
///     "job_type_probabilities": [0.4, 0.3, 0.2, 0.1],
///     "mean_service_time": [0.5, 0.6, 1.0, 0.8],
///     "service_time_uniform_bounds": [20.0, 40.0],
///     "c_background_delay_minutes": 30.0,
///     "c_resume_lead_minutes": 10.0,
///     "reporting_start_time": 0.0,
///     "max_reported_rows": 50,
///     "seed": 12345,
/// })
/// rows = sim.page(0)
/// ```
#[pyclass(name = "Simulator")]
pub struct PySimulator {
    service: SimulationService,
}

fn to_py_err(err: ServiceError) -> PyErr {
    match err {
        ServiceError::Simulation(SimulationError::InvalidConfig(msg)) => {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(msg)
        }
        ServiceError::PageOutOfRange { .. } => {
            PyErr::new::<pyo3::exceptions::PyIndexError, _>(err.to_string())
        }
        other => PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(other.to_string()),
    }
}

#[pymethods]
impl PySimulator {
    #[new]
    fn new() -> Self {
        PySimulator {
            service: SimulationService::new(),
        }
    }

    /// Run one simulation
    ///
    /// Raises ValueError for a rejected configuration.
    fn run(&self, py: Python<'_>, config: &Bound<'_, PyDict>) -> PyResult<Py<PyDict>> {
        let request = parse_simulation_request(config)?;
        let response = py
            .allow_threads(|| self.service.simulate(&request))
            .map_err(to_py_err)?;
        response_to_py(py, &response)
    }

    /// Page of the last run's full history (200 rows, final row last)
    fn page(&self, py: Python<'_>, index: usize) -> PyResult<Py<PyList>> {
        let rows = self.service.page(index).map_err(to_py_err)?;
        Ok(rows_to_py(py, &rows)?.unbind())
    }

    fn page_count(&self) -> PyResult<usize> {
        self.service.page_count().map_err(to_py_err)
    }
}

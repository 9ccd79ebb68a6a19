//! Defines the Axum API routes and handlers.
//!
//! - `POST /api/simulate`: run a simulation, returns the summary and reported rows
//! - `GET /api/rows?page=N`: page of the last run's full history

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use repair_queue_simulator_core_rs::{
    ServiceError, SimulationError, SimulationRequest, SimulationService, StateSnapshot,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

pub type AppState = Arc<SimulationService>;

/// JSON error body with a status code
fn json_error(message: &str, status: StatusCode) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Router with a fresh service
pub fn app() -> Router {
    app_with_state(Arc::new(SimulationService::new()))
}

pub fn app_with_state(state: AppState) -> Router {
    Router::new()
        .route("/api/simulate", post(simulate_handler))
        .route("/api/rows", get(rows_handler))
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped
pub async fn serve(addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app()).await?;
    Ok(())
}

async fn simulate_handler(
    State(service): State<AppState>,
    Json(request): Json<SimulationRequest>,
) -> Response {
    // each request runs its own engine off the async workers
    let outcome = tokio::task::spawn_blocking(move || service.simulate(&request)).await;

    match outcome {
        Ok(Ok(response)) => Json(response).into_response(),
        Ok(Err(ServiceError::Simulation(SimulationError::InvalidConfig(msg)))) => {
            json_error(&msg, StatusCode::BAD_REQUEST)
        }
        Ok(Err(err)) => {
            error!(error = %err, "simulation failed");
            json_error(&err.to_string(), StatusCode::INTERNAL_SERVER_ERROR)
        }
        Err(err) => {
            error!(error = %err, "simulation task did not complete");
            json_error("simulation task failed", StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RowsQuery {
    #[serde(default)]
    pub page: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RowsResponse {
    pub page: usize,
    pub rows: Vec<StateSnapshot>,
}

async fn rows_handler(State(service): State<AppState>, Query(query): Query<RowsQuery>) -> Response {
    match service.page(query.page) {
        Ok(rows) => Json(RowsResponse {
            page: query.page,
            rows,
        })
        .into_response(),
        Err(err @ (ServiceError::NoHistory | ServiceError::PageOutOfRange { .. })) => {
            json_error(&err.to_string(), StatusCode::NOT_FOUND)
        }
        Err(err) => json_error(&err.to_string(), StatusCode::INTERNAL_SERVER_ERROR),
    }
}

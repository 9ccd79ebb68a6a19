//! Command-line and HTTP front ends for the repair queue simulator

pub mod web;

use anyhow::Context;
use repair_queue_simulator_core_rs::SimulationRequest;
use std::path::Path;

/// Load a simulation request from a TOML file
pub fn load_request(path: &Path) -> anyhow::Result<SimulationRequest> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

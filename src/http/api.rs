//! Request/response types for the recovery HTTP service and the blocking
//! simulation call behind `/api/simulate`.

use std::collections::BTreeMap;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::SimError;
use crate::model::Overrides;
use crate::recovery::{
    ACTIVE_ENZYME, DAMAGED, HEALTHY, RESERVE, RecoverySummary, STRESS, recovery_network,
};
use crate::sim::{OutputGrid, SimulationRunner, TauLeapConfig, Trajectory, trajectory_rng};

/// External (client-facing) state keys and the species they stand for.
pub const STATE_KEY_MAP: [(&str, &str); 5] = [
    ("reserves", RESERVE),
    ("active_enzymes", ACTIVE_ENZYME),
    ("damaged_cells", DAMAGED),
    ("healthy_cells", HEALTHY),
    ("stress", STRESS),
];

/// Unmapped keys pass through unchanged.
pub fn internal_species_name(key: &str) -> &str {
    STATE_KEY_MAP
        .iter()
        .find(|(external, _)| *external == key)
        .map_or(key, |&(_, internal)| internal)
}

pub fn external_key(species: &str) -> &str {
    STATE_KEY_MAP
        .iter()
        .find(|(_, internal)| *internal == species)
        .map_or(species, |&(external, _)| external)
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulateRequest {
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
    #[serde(default)]
    pub initial_states: BTreeMap<String, i64>,
}

impl SimulateRequest {
    /// Parses a request body; an empty body means "all defaults".
    pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(e.to_string()))
    }

    pub fn to_overrides(&self) -> Overrides {
        let mut overrides = Overrides::new();
        for (name, &value) in &self.parameters {
            overrides = overrides.parameter(name.clone(), value);
        }
        for (key, &value) in &self.initial_states {
            overrides = overrides.initial(internal_species_name(key), value);
        }
        overrides
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimepointRecord {
    pub time: f64,
    #[serde(flatten)]
    pub values: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulateResponse {
    pub success: bool,
    pub data: Vec<TimepointRecord>,
    pub summary: RecoverySummary,
}

impl SimulateResponse {
    pub fn from_trajectory(trajectory: &Trajectory) -> Result<Self, SimError> {
        let data = trajectory
            .iter()
            .map(|(time, state)| TimepointRecord {
                time,
                values: trajectory
                    .species()
                    .iter()
                    .zip(state)
                    .map(|(name, &v)| (external_key(name).to_string(), v))
                    .collect(),
            })
            .collect();
        Ok(Self {
            success: true,
            data,
            summary: RecoverySummary::from_trajectory(trajectory)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("malformed request body: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Simulation(#[from] SimError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Simulation(SimError::ThreadPool(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Simulation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::warn!(%status, error = %self, "simulate request failed");
        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Settings shared by every request the service handles.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub grid: OutputGrid,
    pub tau_leap: TauLeapConfig,
    /// Fixed seed for reproducible responses; `None` draws a fresh seed per request.
    pub seed: Option<u64>,
}

/// Runs one recovery trajectory for a request. Blocking; call off the async executor.
pub fn simulate(
    request: &SimulateRequest,
    config: &ServiceConfig,
) -> Result<SimulateResponse, ApiError> {
    let runner = SimulationRunner::new(recovery_network().map_err(SimError::from)?)
        .with_config(config.tau_leap)
        .with_overrides(&request.to_overrides())
        .map_err(SimError::from)?;
    let seed = config.seed.unwrap_or_else(rand::random);
    let mut rng = trajectory_rng(Some(seed), 0);
    let trajectory = runner.run(&config.grid, &mut rng)?;
    Ok(SimulateResponse::from_trajectory(&trajectory)?)
}

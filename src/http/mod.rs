//! HTTP passthrough for the recovery model (JSON in, trajectory + summary out).

mod api;
mod server;

pub use api::{
    ApiError, ErrorResponse, STATE_KEY_MAP, ServiceConfig, SimulateRequest, SimulateResponse,
    TimepointRecord, external_key, internal_species_name, simulate,
};
pub use server::{router, serve};

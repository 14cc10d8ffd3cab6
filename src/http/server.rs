//! Axum router for the recovery service.
//!
//! Endpoints:
//! - `POST /api/simulate`: run one trajectory with optional overrides
//! - `GET /api/health`: static liveness payload

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use super::api::{ApiError, ServiceConfig, SimulateRequest, SimulateResponse, simulate};

#[derive(Clone)]
struct AppState {
    config: Arc<ServiceConfig>,
}

pub fn router(config: ServiceConfig) -> Router {
    let state = AppState {
        config: Arc::new(config),
    };
    Router::new()
        .route("/api/simulate", post(simulate_handler))
        .route("/api/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn simulate_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SimulateResponse>, ApiError> {
    let request = SimulateRequest::from_body(&body)?;
    debug!(
        parameters = request.parameters.len(),
        initial_states = request.initial_states.len(),
        "simulate request"
    );
    let config = Arc::clone(&state.config);
    // CPU-bound; keep it off the async workers
    let response = tokio::task::spawn_blocking(move || simulate(&request, &config))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(Json(response))
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Binds `addr` and serves until ctrl-c.
pub async fn serve(addr: SocketAddr, config: ServiceConfig) -> std::io::Result<()> {
    let app = router(config);
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "recovery service listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await
}

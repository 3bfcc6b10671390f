use crate::api::state::AppState;
use crate::core::system_info::{collect_system_info, SystemProbe};
use crate::error::HostscopeError;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use log::{error, info};
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

pub type ApiResponse = (StatusCode, Json<Value>);

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/system-info", get(system_info))
        .route("/api/hardware-info", get(hardware_info))
        .route("/api/reset-io", post(reset_io))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn error_body<S: Into<String>>(message: S) -> ApiResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message.into() })),
    )
}

fn to_json<T: Serialize>(value: &T) -> ApiResponse {
    match serde_json::to_value(value) {
        Ok(body) => (StatusCode::OK, Json(body)),
        Err(e) => {
            error!("Failed to serialize response: {}", e);
            error_body(e.to_string())
        }
    }
}

/// Seconds since the epoch with sub-second precision.
pub fn epoch_seconds(now: DateTime<Utc>) -> f64 {
    now.timestamp_micros() as f64 / 1_000_000.0
}

pub fn health_response(now: DateTime<Utc>) -> ApiResponse {
    (
        StatusCode::OK,
        Json(json!({ "status": "healthy", "timestamp": epoch_seconds(now) })),
    )
}

pub fn system_info_response(probe: &dyn SystemProbe) -> ApiResponse {
    match collect_system_info(probe) {
        Ok(info) => to_json(&info),
        Err(e) => {
            error!("Error in system_info endpoint: {}", e);
            error_body(HostscopeError::AllSubsystemsFailed.to_string())
        }
    }
}

pub fn hardware_info_response(probe: &dyn SystemProbe) -> ApiResponse {
    to_json(&probe.hardware_info())
}

pub fn reset_io_response(state: &AppState) -> ApiResponse {
    match state.probe.live_io_counters() {
        Ok(live) => {
            state.offsets.reset(live);
            (StatusCode::OK, Json(json!({ "status": "I/O counters reset" })))
        }
        Err(e) => {
            error!("Error resetting I/O counters: {}", e);
            error_body(e.to_string())
        }
    }
}

/// Run a blocking poll off the async workers.
async fn blocking<F>(f: F) -> ApiResponse
where
    F: FnOnce() -> ApiResponse + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(response) => response,
        Err(e) => {
            error!("Collector task failed: {}", e);
            error_body("internal error")
        }
    }
}

pub async fn health() -> ApiResponse {
    health_response(Utc::now())
}

pub async fn system_info(State(state): State<AppState>) -> ApiResponse {
    blocking(move || system_info_response(state.probe.as_ref())).await
}

pub async fn hardware_info(State(state): State<AppState>) -> ApiResponse {
    blocking(move || hardware_info_response(state.probe.as_ref())).await
}

pub async fn reset_io(State(state): State<AppState>) -> ApiResponse {
    let response = blocking(move || reset_io_response(&state)).await;
    if response.0.is_success() {
        info!("Network I/O baseline reset");
    }
    response
}

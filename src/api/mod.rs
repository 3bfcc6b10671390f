//! HTTP surface: four `/api` routes over the telemetry collectors.

pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;

//! HTTP JSON API for the workout tracker.
//!
//! Endpoints:
//! - GET  /health             - Server status
//! - POST /log_workout        - Record a workout
//! - POST /get_suggestions    - Model-generated plan for a fitness goal
//! - GET  /workouts/recent    - Most recent workouts (`?limit=N`, default 5)
//! - GET  /workouts/all       - Full history, newest first
//! - GET  /workouts/range     - Workouts within `?start=..&end=..` inclusive
//! - GET  /workouts/stats     - Summary statistics
//! - GET  /, /styles.css, /script.js - Static frontend
//! - GET  /static/{*path}     - Any file under the frontend directory
//!
//! Errors are reported as `{"detail": message}`.

mod handlers;
mod state;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub use self::handlers::{SuggestionRequest, SuggestionResponse};
pub use self::state::AppState;

use self::handlers::{
  handle_all, handle_get_suggestions, handle_health, handle_index, handle_log_workout, handle_range,
  handle_recent, handle_script, handle_static, handle_stats, handle_styles,
};

/// Construct a JSON error response with the given status code and message.
fn json_error(status: StatusCode, message: &str) -> Response {
  (status, Json(serde_json::json!({ "detail": message }))).into_response()
}

/// Build the application router. CORS is permissive (any origin, method and header).
pub fn router(state: Arc<AppState>) -> Router {
  Router::new()
    .route("/", get(handle_index))
    .route("/styles.css", get(handle_styles))
    .route("/script.js", get(handle_script))
    .route("/static/{*path}", get(handle_static))
    .route("/health", get(handle_health))
    .route("/log_workout", post(handle_log_workout))
    .route("/get_suggestions", post(handle_get_suggestions))
    .route("/workouts/recent", get(handle_recent))
    .route("/workouts/all", get(handle_all))
    .route("/workouts/range", get(handle_range))
    .route("/workouts/stats", get(handle_stats))
    .layer(CorsLayer::permissive())
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

/// Bind `host:port` and serve until Ctrl-C
pub async fn start_server(host: &str, port: u16, state: Arc<AppState>) -> Result<(), Box<dyn std::error::Error>> {
  let listener = tokio::net::TcpListener::bind((host, port)).await?;
  info!("Workout tracker listening on http://{}", listener.local_addr()?);

  axum::serve(listener, router(state))
    .with_graceful_shutdown(shutdown_signal())
    .await?;

  info!("Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    error!("Failed to listen for shutdown signal: {}", e);
  }
}

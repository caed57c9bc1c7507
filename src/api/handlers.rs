use std::path::{Component, Path};
use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path as RoutePath, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::json_error;
use super::state::AppState;
use crate::models::NewWorkout;
use crate::stats::compute_stats;
use crate::store::StoreError;
use crate::suggestion::HISTORY_LIMIT;

/// ---------------------------------------------------------------------------
/// Request / Response Bodies
/// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SuggestionRequest {
  pub fitness_goal: String,
  #[serde(default = "default_user_id")]
  pub user_id: String,
}

fn default_user_id() -> String {
  "default".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestionResponse {
  pub suggestion: String,
  pub fitness_goal: String,
  pub generated_at: String,
  pub workout_history_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct RecentParams {
  limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct RangeParams {
  start: NaiveDate,
  end: NaiveDate,
}

/// ---------------------------------------------------------------------------
/// Workout Handlers
/// ---------------------------------------------------------------------------

pub async fn handle_health() -> Response {
  Json(serde_json::json!({
    "status": "healthy",
    "timestamp": Local::now().to_rfc3339(),
  }))
  .into_response()
}

pub async fn handle_log_workout(
  State(state): State<Arc<AppState>>,
  payload: Result<Json<NewWorkout>, JsonRejection>,
) -> Response {
  let Json(workout) = match payload {
    Ok(payload) => payload,
    Err(rejection) => return json_error(StatusCode::UNPROCESSABLE_ENTITY, &rejection.body_text()),
  };

  match state.store.try_record(&workout).await {
    Ok(stored) => {
      info!(id = stored.id, exercise = %stored.exercise_name, date = %stored.date, "Logged workout");
      Json(serde_json::json!({
        "message": "Workout logged successfully",
        "exercise": stored.exercise_name,
        "date": stored.date,
      }))
      .into_response()
    }
    Err(StoreError::Invalid(e)) => json_error(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string()),
    Err(e) => {
      error!("Error logging workout: {}", e);
      json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to log workout")
    }
  }
}

pub async fn handle_get_suggestions(
  State(state): State<Arc<AppState>>,
  payload: Result<Json<SuggestionRequest>, JsonRejection>,
) -> Response {
  let Json(request) = match payload {
    Ok(payload) => payload,
    Err(rejection) => return json_error(StatusCode::UNPROCESSABLE_ENTITY, &rejection.body_text()),
  };

  info!(user_id = %request.user_id, goal = %request.fitness_goal, "Suggestion requested");

  let suggestion = state.generator.generate(&request.fitness_goal).await;

  Json(SuggestionResponse {
    suggestion: suggestion.text,
    fitness_goal: suggestion.fitness_goal,
    generated_at: suggestion.generated_at.to_rfc3339(),
    workout_history_count: suggestion.history_count,
  })
  .into_response()
}

pub async fn handle_recent(
  State(state): State<Arc<AppState>>,
  params: Result<Query<RecentParams>, QueryRejection>,
) -> Response {
  let Query(params) = match params {
    Ok(params) => params,
    Err(rejection) => return json_error(StatusCode::UNPROCESSABLE_ENTITY, &rejection.body_text()),
  };

  let limit = params.limit.unwrap_or(HISTORY_LIMIT);
  Json(state.store.recent(limit).await).into_response()
}

pub async fn handle_all(State(state): State<Arc<AppState>>) -> Response {
  Json(state.store.all().await).into_response()
}

pub async fn handle_range(
  State(state): State<Arc<AppState>>,
  params: Result<Query<RangeParams>, QueryRejection>,
) -> Response {
  let Query(RangeParams { start, end }) = match params {
    Ok(params) => params,
    Err(rejection) => return json_error(StatusCode::UNPROCESSABLE_ENTITY, &rejection.body_text()),
  };

  if start > end {
    return json_error(
      StatusCode::UNPROCESSABLE_ENTITY,
      &format!("start ({}) must not be after end ({})", start, end),
    );
  }

  Json(state.store.by_date_range(start, end).await).into_response()
}

pub async fn handle_stats(State(state): State<Arc<AppState>>) -> Response {
  let workouts = state.store.all().await;
  Json(compute_stats(&workouts)).into_response()
}

/// ---------------------------------------------------------------------------
/// Frontend
/// ---------------------------------------------------------------------------

pub async fn handle_index(State(state): State<Arc<AppState>>) -> Response {
  match tokio::fs::read_to_string(state.frontend_dir.join("index.html")).await {
    Ok(html) => Html(html).into_response(),
    Err(_) => Json(serde_json::json!({
      "message": "Workout Tracker API",
      "status": "healthy",
      "version": env!("CARGO_PKG_VERSION"),
      "note": format!(
        "Frontend not found. Place index.html, styles.css and script.js in {}",
        state.frontend_dir.display()
      ),
    }))
    .into_response(),
  }
}

pub async fn handle_styles(State(state): State<Arc<AppState>>) -> Response {
  serve_asset(&state.frontend_dir, "styles.css", "text/css", "CSS file not found").await
}

pub async fn handle_script(State(state): State<Arc<AppState>>) -> Response {
  serve_asset(
    &state.frontend_dir,
    "script.js",
    "application/javascript",
    "JavaScript file not found",
  )
  .await
}

/// Any file under the frontend directory, mounted at `/static`
pub async fn handle_static(State(state): State<Arc<AppState>>, RoutePath(path): RoutePath<String>) -> Response {
  let relative = Path::new(&path);
  if !relative.components().all(|c| matches!(c, Component::Normal(_))) {
    return json_error(StatusCode::NOT_FOUND, "File not found");
  }

  serve_asset(&state.frontend_dir, &path, content_type_for(relative), "File not found").await
}

fn content_type_for(path: &Path) -> &'static str {
  let extension = path
    .extension()
    .and_then(|e| e.to_str())
    .map(|e| e.to_ascii_lowercase());

  match extension.as_deref() {
    Some("html") | Some("htm") => "text/html; charset=utf-8",
    Some("css") => "text/css",
    Some("js") | Some("mjs") => "application/javascript",
    Some("json") => "application/json",
    Some("svg") => "image/svg+xml",
    Some("png") => "image/png",
    Some("jpg") | Some("jpeg") => "image/jpeg",
    Some("ico") => "image/x-icon",
    Some("txt") => "text/plain; charset=utf-8",
    _ => "application/octet-stream",
  }
}

async fn serve_asset(dir: &Path, name: &str, content_type: &'static str, missing: &str) -> Response {
  match tokio::fs::read(dir.join(name)).await {
    Ok(bytes) => ([(header::CONTENT_TYPE, content_type)], bytes).into_response(),
    Err(_) => json_error(StatusCode::NOT_FOUND, missing),
  }
}

//! Test utilities and helpers for integration and unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Mock data factories
//! - A scripted model provider

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::llm::{CompletionProvider, LlmError, ModelSettings};
use crate::models::{NewWorkout, Workout};

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// Seed the database with one workout per day, the newest dated today.
/// Returns the IDs of created workouts.
pub async fn seed_test_workouts(pool: &SqlitePool, count: usize) -> Vec<i64> {
  let mut workout_ids = Vec::new();
  let exercises = ["Bench Press", "Squats", "Deadlifts", "Pull-ups", "Overhead Press"];

  for i in 0..count {
    let day = Utc::now().date_naive() - ChronoDuration::days(i as i64);
    let exercise = exercises[i % exercises.len()];

    let result = sqlx::query(
      r#"
      INSERT INTO workouts (exercise_name, sets, reps, weight, duration, date, created_at)
      VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
      "#,
    )
    .bind(exercise)
    .bind(3_i64)
    .bind(8 + (i % 4) as i64)
    .bind(95.0 + 10.0 * i as f64)
    .bind(Option::<i64>::None)
    .bind(day)
    .bind(Utc::now())
    .execute(pool)
    .await
    .expect("Failed to insert test workout");

    workout_ids.push(result.last_insert_rowid());
  }

  workout_ids
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

/// Parse a `YYYY-MM-DD` literal
pub fn date(s: &str) -> NaiveDate {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("Invalid test date")
}

/// A stored workout with only the required fields set
pub fn mock_workout(id: i64, exercise_name: &str, day: &str) -> Workout {
  Workout {
    id,
    exercise_name: exercise_name.to_string(),
    sets: None,
    reps: None,
    weight: None,
    duration: None,
    date: date(day),
    created_at: Utc::now(),
  }
}

/// An insert payload for a 3x10 set on the given day
pub fn mock_new_workout(exercise_name: &str, day: &str) -> NewWorkout {
  NewWorkout {
    exercise_name: exercise_name.to_string(),
    sets: Some(3),
    reps: Some(10),
    weight: None,
    duration: None,
    date: Some(date(day)),
  }
}

/// ---------------------------------------------------------------------------
/// Stub Model Provider
/// ---------------------------------------------------------------------------

/// Returns a fixed reply (or error) and remembers every prompt it was sent
pub struct StubProvider {
  reply: Result<String, LlmError>,
  delay: Option<Duration>,
  prompts: Mutex<Vec<String>>,
}

impl StubProvider {
  pub fn replying(text: &str) -> Self {
    Self {
      reply: Ok(text.to_string()),
      delay: None,
      prompts: Mutex::new(Vec::new()),
    }
  }

  pub fn failing(error: LlmError) -> Self {
    Self {
      reply: Err(error),
      delay: None,
      prompts: Mutex::new(Vec::new()),
    }
  }

  pub fn slow(text: &str, delay: Duration) -> Self {
    Self {
      delay: Some(delay),
      ..Self::replying(text)
    }
  }

  pub fn prompts(&self) -> Vec<String> {
    self.prompts.lock().expect("prompt log poisoned").clone()
  }
}

#[async_trait]
impl CompletionProvider for StubProvider {
  fn name(&self) -> &str {
    "stub"
  }

  async fn complete(&self, prompt: &str, _settings: &ModelSettings) -> Result<String, LlmError> {
    self
      .prompts
      .lock()
      .expect("prompt log poisoned")
      .push(prompt.to_string());

    if let Some(delay) = self.delay {
      tokio::time::sleep(delay).await;
    }

    self.reply.clone()
  }
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> =
      sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' AND name = 'workouts'")
        .fetch_all(&pool)
        .await
        .expect("Failed to query tables");

    assert_eq!(tables.len(), 1);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seed_workouts_returns_correct_count() {
    let pool = setup_test_db().await;

    let ids = seed_test_workouts(&pool, 5).await;
    assert_eq!(ids.len(), 5);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workouts")
      .fetch_one(&pool)
      .await
      .expect("Failed to count workouts");

    assert_eq!(count, 5);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_stub_provider_records_prompts() {
    let stub = StubProvider::replying("ok");
    let reply = stub.complete("first", &ModelSettings::default()).await;

    assert_eq!(reply, Ok("ok".to_string()));
    assert_eq!(stub.prompts(), vec!["first".to_string()]);
  }
}

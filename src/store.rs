//! Workout store
//!
//! Append-only log of workouts backed by SQLite. Every read is ordered newest
//! first: `date DESC, created_at DESC`, with the row id breaking exact ties.
//!
//! The contract-level operations (`record`, `recent`, `all`, `by_date_range`)
//! never fail: write errors are reported as `false` and read errors degrade to
//! an empty list. The `try_*` variants expose the underlying error for callers
//! that want it.

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tracing::{debug, error};

use crate::db::DbPool;
use crate::models::{NewWorkout, ValidationError, Workout};

const SELECT_WORKOUTS: &str = r#"
  SELECT id, exercise_name, sets, reps, weight, duration, date, created_at
  FROM workouts
"#;

const ORDER_NEWEST_FIRST: &str = "ORDER BY date DESC, created_at DESC, id DESC";

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Invalid workout: {0}")]
  Invalid(#[from] ValidationError),

  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),
}

/// ---------------------------------------------------------------------------
/// Store
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct WorkoutStore {
  pool: DbPool,
}

impl WorkoutStore {
  pub fn new(pool: DbPool) -> Self {
    Self { pool }
  }

  /// Append one workout. Returns `false` if it was rejected or the write failed.
  pub async fn record(&self, workout: &NewWorkout) -> bool {
    match self.try_record(workout).await {
      Ok(_) => true,
      Err(e) => {
        error!("Error logging workout: {}", e);
        false
      }
    }
  }

  /// Up to `limit` most recent workouts, newest first
  pub async fn recent(&self, limit: u32) -> Vec<Workout> {
    self.try_recent(limit).await.unwrap_or_else(|e| {
      error!("Error fetching recent workouts: {}", e);
      Vec::new()
    })
  }

  /// Every workout, newest first
  pub async fn all(&self) -> Vec<Workout> {
    self.try_all().await.unwrap_or_else(|e| {
      error!("Error fetching all workouts: {}", e);
      Vec::new()
    })
  }

  /// Workouts dated within `start..=end`, newest first
  pub async fn by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<Workout> {
    self.try_by_date_range(start, end).await.unwrap_or_else(|e| {
      error!("Error fetching workouts by date range: {}", e);
      Vec::new()
    })
  }

  /// Insert a workout, returning the stored row
  pub async fn try_record(&self, workout: &NewWorkout) -> Result<Workout, StoreError> {
    workout.validate()?;

    let date = workout.date_or_today();
    let created_at = Utc::now();

    let stored = sqlx::query_as::<_, Workout>(
      r#"
      INSERT INTO workouts (exercise_name, sets, reps, weight, duration, date, created_at)
      VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
      RETURNING id, exercise_name, sets, reps, weight, duration, date, created_at
      "#,
    )
    .bind(&workout.exercise_name)
    .bind(workout.sets)
    .bind(workout.reps)
    .bind(workout.weight)
    .bind(workout.duration)
    .bind(date)
    .bind(created_at)
    .fetch_one(&self.pool)
    .await?;

    debug!(id = stored.id, exercise = %stored.exercise_name, %date, "Workout recorded");

    Ok(stored)
  }

  pub async fn try_recent(&self, limit: u32) -> Result<Vec<Workout>, StoreError> {
    let workouts = sqlx::query_as::<_, Workout>(&format!(
      "{} {} LIMIT ?1",
      SELECT_WORKOUTS, ORDER_NEWEST_FIRST
    ))
    .bind(i64::from(limit))
    .fetch_all(&self.pool)
    .await?;

    Ok(workouts)
  }

  pub async fn try_all(&self) -> Result<Vec<Workout>, StoreError> {
    let workouts = sqlx::query_as::<_, Workout>(&format!("{} {}", SELECT_WORKOUTS, ORDER_NEWEST_FIRST))
      .fetch_all(&self.pool)
      .await?;

    Ok(workouts)
  }

  pub async fn try_by_date_range(
    &self,
    start: NaiveDate,
    end: NaiveDate,
  ) -> Result<Vec<Workout>, StoreError> {
    let workouts = sqlx::query_as::<_, Workout>(&format!(
      "{} WHERE date BETWEEN ?1 AND ?2 {}",
      SELECT_WORKOUTS, ORDER_NEWEST_FIRST
    ))
    .bind(start)
    .bind(end)
    .fetch_all(&self.pool)
    .await?;

    Ok(workouts)
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{date, mock_new_workout, setup_test_db, teardown_test_db};
  use chrono::Local;

  #[tokio::test]
  async fn test_record_then_recent_returns_logged_workout() {
    let pool = setup_test_db().await;
    let store = WorkoutStore::new(pool.clone());

    let bench = NewWorkout {
      exercise_name: "Bench Press".to_string(),
      sets: Some(3),
      reps: Some(10),
      weight: Some(135.0),
      duration: None,
      date: Some(date("2024-01-15")),
    };

    assert!(store.record(&bench).await);

    let recent = store.recent(5).await;
    assert_eq!(recent.len(), 1);

    let stored = &recent[0];
    assert_eq!(stored.exercise_name, "Bench Press");
    assert_eq!(stored.sets, Some(3));
    assert_eq!(stored.reps, Some(10));
    assert_eq!(stored.weight, Some(135.0));
    assert_eq!(stored.duration, None);
    assert_eq!(stored.date, date("2024-01-15"));

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_try_record_returns_the_inserted_row() {
    let pool = setup_test_db().await;
    let store = WorkoutStore::new(pool.clone());

    let first = store
      .try_record(&mock_new_workout("Deadlift", "2024-02-01"))
      .await
      .expect("Should record workout");
    let second = store
      .try_record(&mock_new_workout("Row", "2024-02-01"))
      .await
      .expect("Should record workout");

    assert!(second.id > first.id);
    assert_eq!(second.exercise_name, "Row");
    assert_eq!(second.sets, Some(3));
    assert_eq!(second.date, date("2024-02-01"));

    // One row per call, identical to what a later read sees
    assert_eq!(store.all().await, vec![second, first]);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_record_defaults_date_to_today() {
    let pool = setup_test_db().await;
    let store = WorkoutStore::new(pool.clone());

    let stored = store
      .try_record(&NewWorkout::new("Jump Rope"))
      .await
      .expect("Should record workout");

    // Allow for the test straddling midnight
    let today = Local::now().date_naive();
    assert!(stored.date == today || stored.date.succ_opt() == Some(today));

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_record_rejects_invalid_workout() {
    let pool = setup_test_db().await;
    let store = WorkoutStore::new(pool.clone());

    assert!(!store.record(&NewWorkout::new("")).await);

    let negative_sets = NewWorkout {
      sets: Some(-1),
      ..NewWorkout::new("Squat")
    };
    assert!(matches!(
      store.try_record(&negative_sets).await,
      Err(StoreError::Invalid(_))
    ));

    assert!(store.all().await.is_empty());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_recent_orders_by_date_then_insertion() {
    let pool = setup_test_db().await;
    let store = WorkoutStore::new(pool.clone());

    for (name, day) in [
      ("Squats", "2024-01-16"),
      ("Bench Press", "2024-01-15"),
      ("Deadlifts", "2024-01-17"),
      ("Lunges", "2024-01-16"),
    ] {
      assert!(store.record(&mock_new_workout(name, day)).await);
    }

    let names: Vec<String> = store
      .recent(10)
      .await
      .into_iter()
      .map(|w| w.exercise_name)
      .collect();

    // Same-date workouts come back most recently logged first
    assert_eq!(names, vec!["Deadlifts", "Lunges", "Squats", "Bench Press"]);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_recent_respects_limit() {
    let pool = setup_test_db().await;
    let store = WorkoutStore::new(pool.clone());

    for day in ["2024-02-01", "2024-02-02", "2024-02-03", "2024-02-04"] {
      store.record(&mock_new_workout("Run", day)).await;
    }

    let recent = store.recent(2).await;
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].date, date("2024-02-04"));
    assert_eq!(recent[1].date, date("2024-02-03"));

    assert!(store.recent(0).await.is_empty());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_empty_store_reads_are_empty() {
    let pool = setup_test_db().await;
    let store = WorkoutStore::new(pool.clone());

    assert!(store.recent(5).await.is_empty());
    assert!(store.all().await.is_empty());
    assert!(store
      .by_date_range(date("2024-01-01"), date("2024-12-31"))
      .await
      .is_empty());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_all_is_stable_without_writes() {
    let pool = setup_test_db().await;
    let store = WorkoutStore::new(pool.clone());

    for (name, day) in [("Row", "2024-03-01"), ("Bike", "2024-03-01"), ("Swim", "2024-02-28")] {
      store.record(&mock_new_workout(name, day)).await;
    }

    let first = store.all().await;
    let second = store.all().await;
    assert_eq!(first.len(), 3);
    assert_eq!(first, second);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_by_date_range_is_inclusive() {
    let pool = setup_test_db().await;
    let store = WorkoutStore::new(pool.clone());

    for day in ["2024-01-14", "2024-01-15", "2024-01-16", "2024-01-17", "2024-01-18"] {
      store.record(&mock_new_workout("Plank", day)).await;
    }

    let dates: Vec<NaiveDate> = store
      .by_date_range(date("2024-01-15"), date("2024-01-17"))
      .await
      .into_iter()
      .map(|w| w.date)
      .collect();

    assert_eq!(
      dates,
      vec![date("2024-01-17"), date("2024-01-16"), date("2024-01-15")]
    );

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_closed_pool_degrades_gracefully() {
    let pool = setup_test_db().await;
    let store = WorkoutStore::new(pool.clone());
    pool.close().await;

    assert!(!store.record(&NewWorkout::new("Burpees")).await);
    assert!(store.recent(5).await.is_empty());
    assert!(store.all().await.is_empty());
    assert!(matches!(store.try_all().await, Err(StoreError::Database(_))));
  }
}

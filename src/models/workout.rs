use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A logged workout as persisted. Rows are immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Workout {
  pub id: i64,
  pub exercise_name: String,
  pub sets: Option<i64>,
  pub reps: Option<i64>,
  /// Unit is whatever the caller logs in (kg or lbs)
  pub weight: Option<f64>,
  /// Minutes
  pub duration: Option<i64>,
  pub date: NaiveDate,
  /// Insertion time, only used to order workouts sharing a date
  pub created_at: DateTime<Utc>,
}

/// For inserting new workouts (without id, created_at)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewWorkout {
  pub exercise_name: String,
  #[serde(default)]
  pub sets: Option<i64>,
  #[serde(default)]
  pub reps: Option<i64>,
  #[serde(default)]
  pub weight: Option<f64>,
  #[serde(default)]
  pub duration: Option<i64>,
  /// Defaults to today's local date when omitted
  #[serde(default)]
  pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
  #[error("exercise_name must not be empty")]
  EmptyExerciseName,

  #[error("{field} must be a positive integer, got {value}")]
  NotPositive { field: &'static str, value: i64 },

  #[error("weight must be a non-negative number, got {0}")]
  InvalidWeight(f64),
}

impl NewWorkout {
  pub fn new(exercise_name: impl Into<String>) -> Self {
    Self {
      exercise_name: exercise_name.into(),
      ..Default::default()
    }
  }

  /// Check the field constraints a persisted workout must satisfy
  pub fn validate(&self) -> Result<(), ValidationError> {
    if self.exercise_name.trim().is_empty() {
      return Err(ValidationError::EmptyExerciseName);
    }

    for (field, value) in [("sets", self.sets), ("reps", self.reps), ("duration", self.duration)] {
      if let Some(value) = value {
        if value <= 0 {
          return Err(ValidationError::NotPositive { field, value });
        }
      }
    }

    if let Some(weight) = self.weight {
      if !weight.is_finite() || weight < 0.0 {
        return Err(ValidationError::InvalidWeight(weight));
      }
    }

    Ok(())
  }

  /// The date this workout is recorded under
  pub fn date_or_today(&self) -> NaiveDate {
    self.date.unwrap_or_else(|| Local::now().date_naive())
  }
}

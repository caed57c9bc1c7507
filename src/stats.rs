//! Summary statistics over the full workout log

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::Workout;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WorkoutStats {
  Empty {
    total_workouts: usize,
    unique_exercises: usize,
    message: &'static str,
  },
  Summary {
    total_workouts: usize,
    unique_exercises: usize,
    most_recent_workout: NaiveDate,
    total_duration_minutes: i64,
    /// Workouts per distinct training day, not per calendar week
    average_workouts_per_week: f64,
  },
}

pub fn compute_stats(workouts: &[Workout]) -> WorkoutStats {
  let Some(most_recent_workout) = workouts.iter().map(|w| w.date).max() else {
    return WorkoutStats::Empty {
      total_workouts: 0,
      unique_exercises: 0,
      message: "No workouts found",
    };
  };

  let total_workouts = workouts.len();
  let unique_exercises = workouts
    .iter()
    .map(|w| w.exercise_name.as_str())
    .collect::<HashSet<_>>()
    .len();
  let total_duration_minutes = workouts.iter().filter_map(|w| w.duration).sum();
  let training_days = workouts.iter().map(|w| w.date).collect::<HashSet<_>>().len();

  let per_day = total_workouts as f64 / training_days.max(1) as f64;

  WorkoutStats::Summary {
    total_workouts,
    unique_exercises,
    most_recent_workout,
    total_duration_minutes,
    average_workouts_per_week: (per_day * 100.0).round() / 100.0,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{date, mock_workout};

  #[test]
  fn test_empty_log() {
    let stats = compute_stats(&[]);
    assert_eq!(
      serde_json::to_value(&stats).unwrap(),
      serde_json::json!({"total_workouts": 0, "unique_exercises": 0, "message": "No workouts found"})
    );
  }

  #[test]
  fn test_summary() {
    let mut run = mock_workout(1, "Run", "2024-01-15");
    run.duration = Some(30);
    let mut bench = mock_workout(2, "Bench Press", "2024-01-15");
    bench.sets = Some(3);
    let mut second_run = mock_workout(3, "Run", "2024-01-17");
    second_run.duration = Some(45);

    let stats = compute_stats(&[second_run, bench, run]);

    assert_eq!(
      stats,
      WorkoutStats::Summary {
        total_workouts: 3,
        unique_exercises: 2,
        most_recent_workout: date("2024-01-17"),
        total_duration_minutes: 75,
        average_workouts_per_week: 1.5,
      }
    );
  }

  #[test]
  fn test_average_is_rounded() {
    let workouts = vec![
      mock_workout(1, "A", "2024-01-01"),
      mock_workout(2, "B", "2024-01-02"),
      mock_workout(3, "C", "2024-01-03"),
      mock_workout(4, "D", "2024-01-03"),
    ];

    match compute_stats(&workouts) {
      WorkoutStats::Summary {
        average_workouts_per_week,
        total_duration_minutes,
        ..
      } => {
        assert_eq!(average_workouts_per_week, 1.33);
        assert_eq!(total_duration_minutes, 0);
      }
      other => panic!("Expected summary, got {:?}", other),
    }
  }

  #[test]
  fn test_summary_serializes_flat() {
    let stats = compute_stats(&[mock_workout(1, "Row", "2024-02-02")]);
    let value = serde_json::to_value(&stats).unwrap();

    assert_eq!(value["total_workouts"], 1);
    assert_eq!(value["most_recent_workout"], "2024-02-02");
    assert_eq!(value["average_workouts_per_week"], 1.0);
  }
}

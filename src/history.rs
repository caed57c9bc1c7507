//! Renders workout history into the text block interpolated into prompts

use crate::models::Workout;

pub const NO_HISTORY: &str = "No previous workouts found.";

/// One numbered block per workout, in the order given, separated by a blank
/// line. Fields that were not logged are left out entirely.
pub fn format_history(workouts: &[Workout]) -> String {
    if workouts.is_empty() {
        return NO_HISTORY.to_string();
    }

    workouts
        .iter()
        .enumerate()
        .map(|(i, workout)| format_workout(i + 1, workout))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_workout(number: usize, workout: &Workout) -> String {
    let mut lines = vec![
        format!("Workout {} ({}):", number, workout.date),
        format!("  Exercise: {}", workout.exercise_name),
    ];

    if let Some(sets) = workout.sets {
        lines.push(format!("  Sets: {}", sets));
    }
    if let Some(reps) = workout.reps {
        lines.push(format!("  Reps: {}", reps));
    }
    if let Some(weight) = workout.weight {
        lines.push(format!("  Weight: {} kg/lbs", weight));
    }
    if let Some(duration) = workout.duration {
        lines.push(format!("  Duration: {} minutes", duration));
    }

    lines.join("\n") + "\n"
}

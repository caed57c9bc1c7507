pub mod workout;

pub use workout::{NewWorkout, ValidationError, Workout};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{ExerciseId, RoutineId, UserId, WorkoutId};

/// Sentinel used when neither the last workout nor the history names
/// an equipment or variation.
pub const UNSPECIFIED: &str = "None";

//
// ─── SETS ──────────────────────────────────────────────────────────────────────
//

/// A single performed (or planned) set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSet {
    /// 1-based position within the exercise.
    #[serde(default)]
    pub set_number: u32,
    pub reps: u32,
    pub weight: f64,
}

impl WorkoutSet {
    #[must_use]
    pub fn new(set_number: u32, reps: u32, weight: f64) -> Self {
        Self {
            set_number,
            reps,
            weight,
        }
    }

    /// A set only counts towards progress when it was actually loaded and lifted.
    #[must_use]
    pub fn is_working_set(&self) -> bool {
        self.reps > 0 && self.weight > 0.0
    }

    /// `reps × weight`.
    #[must_use]
    pub fn volume(&self) -> f64 {
        f64::from(self.reps) * self.weight
    }
}

//
// ─── EXERCISES ─────────────────────────────────────────────────────────────────
//

/// An exercise as performed within one workout or session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutExercise {
    pub exercise_id: ExerciseId,
    pub equipment: String,
    pub variation: String,
    pub sets: Vec<WorkoutSet>,
    #[serde(default)]
    pub name: String,
}

impl WorkoutExercise {
    /// True when at least one set has a positive rep count.
    #[must_use]
    pub fn has_performed_sets(&self) -> bool {
        self.sets.iter().any(|s| s.reps > 0)
    }
}

//
// ─── WORKOUT ───────────────────────────────────────────────────────────────────
//

/// A completed workout. Append-only: never edited after it is recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: WorkoutId,
    pub user_id: UserId,
    pub routine_id: RoutineId,
    pub workout_date: DateTime<Utc>,
    pub exercises: Vec<WorkoutExercise>,
}

/// A workout that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkout {
    pub user_id: UserId,
    pub routine_id: RoutineId,
    pub workout_date: DateTime<Utc>,
    pub exercises: Vec<WorkoutExercise>,
}

impl NewWorkout {
    #[must_use]
    pub fn assign_id(self, id: WorkoutId) -> Workout {
        Workout {
            id,
            user_id: self.user_id,
            routine_id: self.routine_id,
            workout_date: self.workout_date,
            exercises: self.exercises,
        }
    }
}

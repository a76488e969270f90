use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{ExerciseId, HistoryId, UserId};
use crate::model::workout::{WorkoutExercise, WorkoutSet};

/// Sets performed for one exercise on one occasion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSets {
    pub date: DateTime<Utc>,
    pub equipment: String,
    pub variation: String,
    pub workout_sets: Vec<WorkoutSet>,
}

impl ExerciseSets {
    /// Snapshot a performed exercise at `date`.
    #[must_use]
    pub fn from_exercise(exercise: &WorkoutExercise, date: DateTime<Utc>) -> Self {
        Self {
            date,
            equipment: exercise.equipment.clone(),
            variation: exercise.variation.clone(),
            workout_sets: exercise.sets.clone(),
        }
    }

    /// Calendar day (UTC) this entry belongs to.
    #[must_use]
    pub fn day(&self) -> NaiveDate {
        self.date.date_naive()
    }
}

/// Append-only record of every occasion a user performed an exercise.
///
/// Entries are kept in insertion order, which is chronological.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseHistory {
    pub id: HistoryId,
    pub user_id: UserId,
    pub exercise_id: ExerciseId,
    pub sets: Vec<ExerciseSets>,
}

impl ExerciseHistory {
    #[must_use]
    pub fn new(id: HistoryId, user_id: UserId, exercise_id: ExerciseId) -> Self {
        Self {
            id,
            user_id,
            exercise_id,
            sets: Vec::new(),
        }
    }

    /// Most recently appended entry.
    #[must_use]
    pub fn latest(&self) -> Option<&ExerciseSets> {
        self.sets.last()
    }

    pub fn append(&mut self, entry: ExerciseSets) {
        self.sets.push(entry);
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{ExerciseId, RoutineId, UserId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RoutineError {
    #[error("routine name cannot be empty")]
    EmptyName,

    #[error("routine exercise name cannot be empty")]
    EmptyExerciseName,

    #[error("routine exercise has {sets} target sets, at most {max} allowed", max = MAX_TARGET_SETS)]
    TooManySets { sets: u32 },
}

/// Upper bound on `RoutineExercise::target_sets`.
pub const MAX_TARGET_SETS: u32 = 100;

//
// ─── TARGET REPS ───────────────────────────────────────────────────────────────
//

/// Prescribed repetitions for a routine exercise.
///
/// Routines either prescribe the same rep count for every set, or a
/// separate count per set (e.g. a pyramid `[12, 10, 8]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetReps {
    Uniform(u32),
    PerSet(Vec<u32>),
}

impl TargetReps {
    /// Rep target for the zero-based set `index`.
    ///
    /// A per-set list shorter than the set count repeats its last value;
    /// an empty list prescribes zero reps.
    #[must_use]
    pub fn for_set(&self, index: usize) -> u32 {
        match self {
            TargetReps::Uniform(reps) => *reps,
            TargetReps::PerSet(reps) => reps
                .get(index)
                .or_else(|| reps.last())
                .copied()
                .unwrap_or(0),
        }
    }
}

impl From<u32> for TargetReps {
    fn from(reps: u32) -> Self {
        TargetReps::Uniform(reps)
    }
}

impl From<Vec<u32>> for TargetReps {
    fn from(reps: Vec<u32>) -> Self {
        TargetReps::PerSet(reps)
    }
}

//
// ─── ROUTINE ───────────────────────────────────────────────────────────────────
//

/// One prescribed exercise inside a routine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineExercise {
    pub exercise_id: ExerciseId,
    pub name: String,
    pub target_sets: u32,
    pub target_reps: TargetReps,
}

impl RoutineExercise {
    #[must_use]
    pub fn new(
        exercise_id: ExerciseId,
        name: impl Into<String>,
        target_sets: u32,
        target_reps: impl Into<TargetReps>,
    ) -> Self {
        Self {
            exercise_id,
            name: name.into(),
            target_sets,
            target_reps: target_reps.into(),
        }
    }

    /// Number of sets as a length, saturating on narrow targets.
    #[must_use]
    pub fn set_count(&self) -> usize {
        usize::try_from(self.target_sets).unwrap_or(usize::MAX)
    }
}

/// A named, ordered list of prescribed exercises owned by one user.
///
/// Exercise order is significant: the session planner matches it
/// position by position against the previous workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    id: RoutineId,
    user_id: UserId,
    name: String,
    description: Option<String>,
    exercises: Vec<RoutineExercise>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Routine {
    /// Creates a routine.
    ///
    /// # Errors
    ///
    /// Returns `RoutineError::EmptyName` if the name is blank,
    /// `RoutineError::EmptyExerciseName` if any exercise name is blank, or
    /// `RoutineError::TooManySets` if an exercise exceeds
    /// [`MAX_TARGET_SETS`].
    pub fn new(
        id: RoutineId,
        user_id: UserId,
        name: impl Into<String>,
        description: Option<String>,
        exercises: Vec<RoutineExercise>,
        now: DateTime<Utc>,
    ) -> Result<Self, RoutineError> {
        Self::from_persisted(id, user_id, name, description, exercises, now, now)
    }

    /// Rehydrate a routine from storage.
    ///
    /// # Errors
    ///
    /// Same validation as [`Routine::new`].
    pub fn from_persisted(
        id: RoutineId,
        user_id: UserId,
        name: impl Into<String>,
        description: Option<String>,
        exercises: Vec<RoutineExercise>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, RoutineError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RoutineError::EmptyName);
        }
        if exercises.iter().any(|e| e.name.trim().is_empty()) {
            return Err(RoutineError::EmptyExerciseName);
        }
        if let Some(e) = exercises.iter().find(|e| e.target_sets > MAX_TARGET_SETS) {
            return Err(RoutineError::TooManySets {
                sets: e.target_sets,
            });
        }
        let description = description.filter(|d| !d.trim().is_empty());

        Ok(Self {
            id,
            user_id,
            name,
            description,
            exercises,
            created_at,
            updated_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> RoutineId {
        self.id
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn exercises(&self) -> &[RoutineExercise] {
        &self.exercises
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns a copy carrying a storage-assigned id.
    #[must_use]
    pub fn with_id(mut self, id: RoutineId) -> Self {
        self.id = id;
        self
    }
}

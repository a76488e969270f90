use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{RoutineId, SessionId, UserId};
use crate::model::workout::{NewWorkout, WorkoutExercise};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionStateError {
    #[error("exercise index {index} out of range for session with {len} exercises")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Draft of the next workout for a user.
///
/// A user has at most one active session. It is overwritten rather than
/// appended to, and it expires after a period of inactivity; losing it
/// only loses progress toward the next workout, never recorded history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSession {
    id: Option<SessionId>,
    user_id: UserId,
    routine_id: RoutineId,
    exercises: Vec<WorkoutExercise>,
    exercise_index: usize,
    last_update: DateTime<Utc>,
}

impl WorkoutSession {
    /// Start a fresh session positioned on the first exercise.
    #[must_use]
    pub fn new(
        user_id: UserId,
        routine_id: RoutineId,
        exercises: Vec<WorkoutExercise>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            user_id,
            routine_id,
            exercises,
            exercise_index: 0,
            last_update: now,
        }
    }

    /// Rehydrate a session from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::IndexOutOfRange` if the stored index does
    /// not point into a non-empty exercise list.
    pub fn from_persisted(
        id: SessionId,
        user_id: UserId,
        routine_id: RoutineId,
        exercises: Vec<WorkoutExercise>,
        exercise_index: usize,
        last_update: DateTime<Utc>,
    ) -> Result<Self, SessionStateError> {
        if !exercises.is_empty() && exercise_index >= exercises.len() {
            return Err(SessionStateError::IndexOutOfRange {
                index: exercise_index,
                len: exercises.len(),
            });
        }
        Ok(Self {
            id: Some(id),
            user_id,
            routine_id,
            exercises,
            exercise_index,
            last_update,
        })
    }

    #[must_use]
    pub fn id(&self) -> Option<SessionId> {
        self.id
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn routine_id(&self) -> RoutineId {
        self.routine_id
    }

    #[must_use]
    pub fn exercises(&self) -> &[WorkoutExercise] {
        &self.exercises
    }

    #[must_use]
    pub fn exercise_index(&self) -> usize {
        self.exercise_index
    }

    #[must_use]
    pub fn last_update(&self) -> DateTime<Utc> {
        self.last_update
    }

    #[must_use]
    pub fn with_id(mut self, id: SessionId) -> Self {
        self.id = Some(id);
        self
    }

    /// Refresh the inactivity timer.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_update = now;
    }

    /// Replace the exercise at `index` with the athlete's edits and move the
    /// cursor there.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::IndexOutOfRange` if `index` is past the end.
    pub fn update_exercise(
        &mut self,
        index: usize,
        exercise: WorkoutExercise,
        now: DateTime<Utc>,
    ) -> Result<(), SessionStateError> {
        let len = self.exercises.len();
        let slot = self
            .exercises
            .get_mut(index)
            .ok_or(SessionStateError::IndexOutOfRange { index, len })?;
        *slot = exercise;
        self.exercise_index = index;
        self.last_update = now;
        Ok(())
    }

    /// True once `ttl` has elapsed since the last update.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now.signed_duration_since(self.last_update) > ttl
    }

    /// Freeze the session into a workout dated `completed_at`.
    #[must_use]
    pub fn to_new_workout(&self, completed_at: DateTime<Utc>) -> NewWorkout {
        NewWorkout {
            user_id: self.user_id,
            routine_id: self.routine_id,
            workout_date: completed_at,
            exercises: self.exercises.clone(),
        }
    }
}

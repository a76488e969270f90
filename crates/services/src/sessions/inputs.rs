use std::collections::HashMap;

use tracing::debug;

use liftlog_core::model::{ExerciseId, ExerciseSets, Routine, RoutineId, UserId, Workout};
use liftlog_core::planner::{LastWorkoutCursor, SessionBuilder, SessionPlan};
use storage::repository::{RoutineRepository, StorageError, WorkoutRepository};

use crate::error::SessionError;
use crate::history_service::HistoryService;

/// Everything the planner needs, fetched up front so planning stays pure.
#[derive(Debug, Clone)]
pub(crate) struct SessionInputs {
    pub routine: Routine,
    pub last_workout: Option<Workout>,
    pub history: HashMap<ExerciseId, ExerciseSets>,
}

impl SessionInputs {
    /// Load the routine, its last workout and the history entries the
    /// planner will fall back to.
    ///
    /// History is only read for routine exercises that will not be matched
    /// against the last workout.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::RoutineNotFound` if the routine is missing, or
    /// `SessionError::Storage` for other routine or workout read failures.
    pub async fn load(
        user_id: UserId,
        routine_id: RoutineId,
        routines: &dyn RoutineRepository,
        workouts: &dyn WorkoutRepository,
        history: &HistoryService,
    ) -> Result<Self, SessionError> {
        let routine = match routines.get_routine(user_id, routine_id).await {
            Ok(routine) => routine,
            Err(StorageError::NotFound) => return Err(SessionError::RoutineNotFound),
            Err(err) => return Err(err.into()),
        };

        let last_workout = match workouts.last_workout_for_routine(user_id, routine_id).await {
            Ok(workout) => Some(workout),
            Err(StorageError::NotFound) => None,
            Err(err) => return Err(err.into()),
        };

        let mut entries = HashMap::new();
        for exercise_id in unmatched_exercises(&routine, last_workout.as_ref()) {
            if entries.contains_key(&exercise_id) {
                continue;
            }
            if let Some(entry) = history.latest_entry(user_id, exercise_id).await {
                entries.insert(exercise_id, entry);
            }
        }

        debug!(
            user_id = %user_id,
            routine_id = %routine_id,
            has_last_workout = last_workout.is_some(),
            history_entries = entries.len(),
            "session inputs loaded"
        );

        Ok(Self {
            routine,
            last_workout,
            history: entries,
        })
    }

    pub fn plan(&self) -> SessionPlan {
        SessionBuilder::new(self.routine.exercises())
            .with_last_workout(self.last_workout.as_ref())
            .build(|exercise_id| self.history.get(&exercise_id).cloned())
    }
}

/// Routine exercises, in order, that get no positional match in `last_workout`.
fn unmatched_exercises(routine: &Routine, last_workout: Option<&Workout>) -> Vec<ExerciseId> {
    let mut cursor = LastWorkoutCursor::new(last_workout);
    routine
        .exercises()
        .iter()
        .filter(|exercise| cursor.take_match(exercise.exercise_id).is_none())
        .map(|exercise| exercise.exercise_id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftlog_core::model::{RoutineExercise, WorkoutExercise, WorkoutId, WorkoutSet};
    use liftlog_core::time::fixed_now;

    fn routine(ids: &[u64]) -> Routine {
        let exercises = ids
            .iter()
            .map(|id| RoutineExercise::new(ExerciseId::new(*id), format!("E{id}"), 2, 8))
            .collect();
        Routine::new(
            RoutineId::new(1),
            UserId::new(1),
            "R",
            None,
            exercises,
            fixed_now(),
        )
        .unwrap()
    }

    fn workout(ids: &[u64]) -> Workout {
        Workout {
            id: WorkoutId::new(1),
            user_id: UserId::new(1),
            routine_id: RoutineId::new(1),
            workout_date: fixed_now(),
            exercises: ids
                .iter()
                .map(|id| WorkoutExercise {
                    exercise_id: ExerciseId::new(*id),
                    equipment: "Barbell".into(),
                    variation: "None".into(),
                    sets: vec![WorkoutSet::new(1, 8, 50.0)],
                    name: String::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn every_exercise_is_unmatched_without_last_workout() {
        let ids = unmatched_exercises(&routine(&[1, 2]), None);
        assert_eq!(ids, vec![ExerciseId::new(1), ExerciseId::new(2)]);
    }

    #[test]
    fn removed_exercise_leaves_later_ones_unmatched() {
        // Last workout had 1, 2, 3; the routine dropped 2.
        let ids = unmatched_exercises(&routine(&[1, 3]), Some(&workout(&[1, 2, 3])));
        assert_eq!(ids, vec![ExerciseId::new(3)]);
    }

    #[test]
    fn inserted_exercise_is_the_only_unmatched_one() {
        let ids = unmatched_exercises(&routine(&[1, 4, 2]), Some(&workout(&[1, 2])));
        assert_eq!(ids, vec![ExerciseId::new(4)]);
    }
}

use std::sync::Arc;

use tracing::{debug, warn};

use liftlog_core::model::{ExerciseId, ExerciseSets, NewWorkout, UserId};
use liftlog_core::progress::{ProgressPoint, aggregate_history};
use storage::repository::{ExerciseHistoryRepository, StorageError};

use crate::error::HistoryServiceError;
use crate::settings::ProgressionSettings;

/// Records completed workouts into per-exercise history and reads it back
/// as progress series.
#[derive(Clone)]
pub struct HistoryService {
    settings: ProgressionSettings,
    histories: Arc<dyn ExerciseHistoryRepository>,
}

impl HistoryService {
    #[must_use]
    pub fn new(
        settings: ProgressionSettings,
        histories: Arc<dyn ExerciseHistoryRepository>,
    ) -> Self {
        Self {
            settings,
            histories,
        }
    }

    /// History entries a completed `workout` contributes, one per
    /// performed exercise, in workout order.
    ///
    /// Warm-up and cool-down exercises, exercises without sets and exercises
    /// where no set has reps are skipped.
    #[must_use]
    pub fn history_entries(&self, workout: &NewWorkout) -> Vec<(ExerciseId, ExerciseSets)> {
        workout
            .exercises
            .iter()
            .filter(|exercise| {
                let keep = !self.settings.is_excluded_from_history(exercise.exercise_id)
                    && !exercise.sets.is_empty()
                    && exercise.has_performed_sets();
                if !keep {
                    debug!(
                        user_id = %workout.user_id,
                        exercise_id = %exercise.exercise_id,
                        "skipping exercise for history"
                    );
                }
                keep
            })
            .map(|exercise| {
                (
                    exercise.exercise_id,
                    ExerciseSets::from_exercise(exercise, workout.workout_date),
                )
            })
            .collect()
    }

    /// Most recent history entry for an exercise.
    ///
    /// Missing history and read failures both yield `None`; failures are
    /// logged, since a session can always fall back to routine targets.
    pub async fn latest_entry(
        &self,
        user_id: UserId,
        exercise_id: ExerciseId,
    ) -> Option<ExerciseSets> {
        match self.histories.get_history(user_id, exercise_id).await {
            Ok(history) => history.latest().cloned(),
            Err(StorageError::NotFound) => None,
            Err(err) => {
                warn!(
                    user_id = %user_id,
                    exercise_id = %exercise_id,
                    error = %err,
                    "history read failed, treating as no history"
                );
                None
            }
        }
    }

    /// Daily progress series for one exercise. Unknown exercises yield an
    /// empty series.
    ///
    /// # Errors
    ///
    /// Returns `HistoryServiceError::Storage` on storage failures other
    /// than not-found.
    pub async fn progress(
        &self,
        user_id: UserId,
        exercise_id: ExerciseId,
    ) -> Result<Vec<ProgressPoint>, HistoryServiceError> {
        let history = match self.histories.get_history(user_id, exercise_id).await {
            Ok(history) => history,
            Err(StorageError::NotFound) => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        Ok(aggregate_history(&history.sets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftlog_core::model::{RoutineId, WorkoutExercise, WorkoutSet};
    use liftlog_core::time::fixed_day;
    use storage::repository::InMemoryRepository;

    fn exercise(id: u64, sets: Vec<WorkoutSet>) -> WorkoutExercise {
        WorkoutExercise {
            exercise_id: ExerciseId::new(id),
            equipment: "Barbell".into(),
            variation: "None".into(),
            sets,
            name: format!("Exercise {id}"),
        }
    }

    fn workout(day: i64, exercises: Vec<WorkoutExercise>) -> NewWorkout {
        NewWorkout {
            user_id: UserId::new(1),
            routine_id: RoutineId::new(1),
            workout_date: fixed_day(day),
            exercises,
        }
    }

    fn service(repo: &InMemoryRepository) -> HistoryService {
        let settings = ProgressionSettings::default()
            .with_warmup(Some(ExerciseId::new(90)))
            .with_cooldown(Some(ExerciseId::new(91)));
        HistoryService::new(settings, Arc::new(repo.clone()))
    }

    async fn record(repo: &InMemoryRepository, svc: &HistoryService, workout: &NewWorkout) {
        for (exercise_id, entry) in svc.history_entries(workout) {
            repo.append_entry(workout.user_id, exercise_id, &entry)
                .await
                .unwrap();
        }
    }

    #[test]
    fn entries_skip_bookends_and_unperformed_exercises() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        let done = workout(
            0,
            vec![
                exercise(90, vec![WorkoutSet::new(1, 10, 0.0)]),
                exercise(1, vec![WorkoutSet::new(1, 5, 100.0)]),
                exercise(2, Vec::new()),
                exercise(3, vec![WorkoutSet::new(1, 0, 40.0)]),
                exercise(91, vec![WorkoutSet::new(1, 10, 0.0)]),
            ],
        );

        let entries = svc.history_entries(&done);
        assert_eq!(entries.len(), 1);
        let (exercise_id, entry) = &entries[0];
        assert_eq!(*exercise_id, ExerciseId::new(1));
        assert_eq!(entry.date, fixed_day(0));
        assert_eq!(entry.workout_sets, vec![WorkoutSet::new(1, 5, 100.0)]);
    }

    #[tokio::test]
    async fn latest_entry_follows_insertion_order() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        let user = UserId::new(1);
        assert!(svc.latest_entry(user, ExerciseId::new(1)).await.is_none());

        for (day, weight) in [(0, 100.0), (3, 105.0)] {
            let w = workout(day, vec![exercise(1, vec![WorkoutSet::new(1, 5, weight)])]);
            record(&repo, &svc, &w).await;
        }

        let latest = svc.latest_entry(user, ExerciseId::new(1)).await.unwrap();
        assert_eq!(latest.workout_sets[0].weight, 105.0);
    }

    #[tokio::test]
    async fn progress_is_empty_for_unknown_exercise() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        let series = svc.progress(UserId::new(1), ExerciseId::new(5)).await.unwrap();
        assert!(series.is_empty());
    }

    #[tokio::test]
    async fn progress_interpolates_between_recorded_days() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        for (day, weight) in [(0, 100.0), (3, 110.0)] {
            let w = workout(day, vec![exercise(1, vec![WorkoutSet::new(1, 5, weight)])]);
            record(&repo, &svc, &w).await;
        }

        let series = svc.progress(UserId::new(1), ExerciseId::new(1)).await.unwrap();
        assert_eq!(series.len(), 4);
        assert_eq!(series[0].volume, Some(500.0));
        assert!(!series[1].is_recorded());
        assert!((series[1].interpolated_weight - 102.5).abs() < 1e-9);
        assert!((series[2].interpolated_weight - 107.5).abs() < 1e-9);
        assert_eq!(series[3].weight, Some(110.0));
    }
}

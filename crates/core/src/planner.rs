//! Pre-fills the next workout session from a routine and past performance.
//!
//! Each routine exercise is seeded from the first available source:
//!
//! 1. the exercise at the *same position* in the last workout of the routine,
//! 2. the latest history entry for the exercise,
//! 3. the routine's rep target at zero weight.
//!
//! Sources 1 and 2 only cover as many sets as they recorded; the remainder
//! of `target_sets` always comes from source 3.

use crate::model::{
    ExerciseId, ExerciseSets, RoutineExercise, UNSPECIFIED, Workout, WorkoutExercise, WorkoutSet,
};

//
// ─── LAST WORKOUT CURSOR ───────────────────────────────────────────────────────
//

/// Position in the previous workout's exercise list.
///
/// Advances only when the exercise under it matches the routine exercise
/// being planned. A mismatch leaves it in place, so the same last-workout
/// exercise is offered to the next routine exercise; an exercise that was
/// removed from the routine therefore blocks every later match.
#[derive(Debug, Clone)]
pub struct LastWorkoutCursor<'a> {
    exercises: &'a [WorkoutExercise],
    position: usize,
}

impl<'a> LastWorkoutCursor<'a> {
    #[must_use]
    pub fn new(last_workout: Option<&'a Workout>) -> Self {
        Self {
            exercises: last_workout.map(|w| w.exercises.as_slice()).unwrap_or(&[]),
            position: 0,
        }
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the exercise under the cursor if it is `exercise_id`, and
    /// advances past it. Returns `None` without moving otherwise.
    pub fn take_match(&mut self, exercise_id: ExerciseId) -> Option<&'a WorkoutExercise> {
        let candidate = self.exercises.get(self.position)?;
        if candidate.exercise_id != exercise_id {
            return None;
        }
        self.position += 1;
        Some(candidate)
    }
}

//
// ─── PLAN ──────────────────────────────────────────────────────────────────────
//

/// Where a planned exercise took its starting values from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedSource {
    LastWorkout,
    History,
    Defaults,
}

/// Result of planning a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPlan {
    pub exercises: Vec<WorkoutExercise>,
    pub sources: Vec<SeedSource>,
}

impl SessionPlan {
    /// Number of exercises seeded from `source`.
    #[must_use]
    pub fn count(&self, source: SeedSource) -> usize {
        self.sources.iter().filter(|s| **s == source).count()
    }
}

/// Builds the exercise list of the next session for one routine.
pub struct SessionBuilder<'a> {
    routine: &'a [RoutineExercise],
    last_workout: Option<&'a Workout>,
}

impl<'a> SessionBuilder<'a> {
    #[must_use]
    pub fn new(routine: &'a [RoutineExercise]) -> Self {
        Self {
            routine,
            last_workout: None,
        }
    }

    /// Use the most recent completed workout of this routine as the primary source.
    #[must_use]
    pub fn with_last_workout(mut self, last_workout: Option<&'a Workout>) -> Self {
        self.last_workout = last_workout;
        self
    }

    /// Plan every routine exercise, in routine order.
    ///
    /// `latest_history` is consulted only for exercises without a positional
    /// match in the last workout, and returns the most recent history entry
    /// for an exercise, if any.
    pub fn build<F>(self, mut latest_history: F) -> SessionPlan
    where
        F: FnMut(ExerciseId) -> Option<ExerciseSets>,
    {
        let mut cursor = LastWorkoutCursor::new(self.last_workout);
        let mut exercises = Vec::with_capacity(self.routine.len());
        let mut sources = Vec::with_capacity(self.routine.len());

        for routine_exercise in self.routine {
            let (planned, source) = match cursor.take_match(routine_exercise.exercise_id) {
                Some(previous) => (
                    plan_exercise(
                        routine_exercise,
                        &previous.equipment,
                        &previous.variation,
                        &previous.sets,
                    ),
                    SeedSource::LastWorkout,
                ),
                None => match latest_history(routine_exercise.exercise_id) {
                    Some(entry) => (
                        plan_exercise(
                            routine_exercise,
                            &entry.equipment,
                            &entry.variation,
                            &entry.workout_sets,
                        ),
                        SeedSource::History,
                    ),
                    None => (
                        plan_exercise(routine_exercise, "", "", &[]),
                        SeedSource::Defaults,
                    ),
                },
            };
            exercises.push(planned);
            sources.push(source);
        }

        SessionPlan { exercises, sources }
    }
}

/// Convenience wrapper returning only the planned exercises.
pub fn build_session<F>(
    routine: &[RoutineExercise],
    last_workout: Option<&Workout>,
    latest_history: F,
) -> Vec<WorkoutExercise>
where
    F: FnMut(ExerciseId) -> Option<ExerciseSets>,
{
    SessionBuilder::new(routine)
        .with_last_workout(last_workout)
        .build(latest_history)
        .exercises
}

fn plan_exercise(
    routine_exercise: &RoutineExercise,
    equipment: &str,
    variation: &str,
    recorded: &[WorkoutSet],
) -> WorkoutExercise {
    let target = routine_exercise.set_count();
    let mut sets: Vec<WorkoutSet> = recorded
        .iter()
        .take(target)
        .enumerate()
        .map(|(i, set)| WorkoutSet::new(set_number(i), set.reps, set.weight))
        .collect();

    for i in sets.len()..target {
        sets.push(WorkoutSet::new(
            set_number(i),
            routine_exercise.target_reps.for_set(i),
            0.0,
        ));
    }

    WorkoutExercise {
        exercise_id: routine_exercise.exercise_id,
        equipment: or_unspecified(equipment),
        variation: or_unspecified(variation),
        sets,
        name: routine_exercise.name.clone(),
    }
}

fn set_number(index: usize) -> u32 {
    u32::try_from(index + 1).unwrap_or(u32::MAX)
}

fn or_unspecified(value: &str) -> String {
    if value.trim().is_empty() {
        UNSPECIFIED.to_owned()
    } else {
        value.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RoutineId, TargetReps, UserId, WorkoutId};
    use crate::time::fixed_now;
    use std::collections::HashMap;

    const A: ExerciseId = ExerciseId::new(1);
    const B: ExerciseId = ExerciseId::new(2);
    const C: ExerciseId = ExerciseId::new(3);

    fn routine_exercise(id: ExerciseId, sets: u32, reps: u32) -> RoutineExercise {
        RoutineExercise::new(id, format!("Exercise {id}"), sets, reps)
    }

    fn performed(id: ExerciseId, sets: &[(u32, f64)]) -> WorkoutExercise {
        WorkoutExercise {
            exercise_id: id,
            equipment: "Barbell".into(),
            variation: "Paused".into(),
            sets: sets
                .iter()
                .enumerate()
                .map(|(i, (reps, weight))| WorkoutSet::new(set_number(i), *reps, *weight))
                .collect(),
            name: String::new(),
        }
    }

    fn workout(exercises: Vec<WorkoutExercise>) -> Workout {
        Workout {
            id: WorkoutId::new(1),
            user_id: UserId::new(1),
            routine_id: RoutineId::new(1),
            workout_date: fixed_now(),
            exercises,
        }
    }

    fn history_entry(equipment: &str, sets: &[(u32, f64)]) -> ExerciseSets {
        ExerciseSets {
            date: fixed_now(),
            equipment: equipment.into(),
            variation: "Incline".into(),
            workout_sets: sets
                .iter()
                .enumerate()
                .map(|(i, (reps, weight))| WorkoutSet::new(set_number(i), *reps, *weight))
                .collect(),
        }
    }

    fn reps_and_weights(exercise: &WorkoutExercise) -> Vec<(u32, f64)> {
        exercise.sets.iter().map(|s| (s.reps, s.weight)).collect()
    }

    #[test]
    fn defaults_without_any_prior_data() {
        let routine = vec![routine_exercise(A, 3, 8), routine_exercise(B, 2, 12)];

        let plan = SessionBuilder::new(&routine).build(|_| None);

        assert_eq!(plan.exercises.len(), 2);
        assert_eq!(plan.count(SeedSource::Defaults), 2);
        for (planned, prescribed) in plan.exercises.iter().zip(&routine) {
            assert_eq!(planned.exercise_id, prescribed.exercise_id);
            assert_eq!(planned.sets.len(), prescribed.set_count());
            assert_eq!(planned.equipment, UNSPECIFIED);
            assert_eq!(planned.variation, UNSPECIFIED);
            assert!(planned.sets.iter().all(|s| s.weight == 0.0));
            assert!(planned
                .sets
                .iter()
                .all(|s| s.reps == prescribed.target_reps.for_set(0)));
        }
        let numbers: Vec<u32> = plan.exercises[0].sets.iter().map(|s| s.set_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn last_workout_shortfall_is_padded_and_unmatched_falls_to_defaults() {
        let routine = vec![routine_exercise(A, 3, 8), routine_exercise(B, 3, 10)];
        let last = workout(vec![performed(A, &[(12, 50.0), (10, 55.0)])]);

        let exercises = build_session(&routine, Some(&last), |_| None);

        assert_eq!(
            reps_and_weights(&exercises[0]),
            vec![(12, 50.0), (10, 55.0), (8, 0.0)]
        );
        assert_eq!(exercises[0].equipment, "Barbell");
        assert_eq!(exercises[0].variation, "Paused");
        assert_eq!(
            reps_and_weights(&exercises[1]),
            vec![(10, 0.0), (10, 0.0), (10, 0.0)]
        );
        assert_eq!(exercises[1].equipment, UNSPECIFIED);
    }

    #[test]
    fn identical_order_reuses_every_exercise_and_truncates_extra_sets() {
        let routine = vec![routine_exercise(A, 2, 8), routine_exercise(B, 1, 10)];
        let last = workout(vec![
            performed(A, &[(8, 60.0), (8, 62.5), (6, 65.0)]),
            performed(B, &[(10, 20.0)]),
        ]);

        let plan = SessionBuilder::new(&routine)
            .with_last_workout(Some(&last))
            .build(|_| panic!("history must not be consulted on a positional match"));

        assert_eq!(plan.count(SeedSource::LastWorkout), 2);
        assert_eq!(reps_and_weights(&plan.exercises[0]), vec![(8, 60.0), (8, 62.5)]);
        assert_eq!(reps_and_weights(&plan.exercises[1]), vec![(10, 20.0)]);
    }

    #[test]
    fn history_seeds_unmatched_exercise() {
        let routine = vec![routine_exercise(A, 3, 5)];
        let mut latest = HashMap::new();
        latest.insert(A, history_entry("Dumbbell", &[(5, 30.0), (5, 32.5)]));

        let plan = SessionBuilder::new(&routine).build(|id| latest.get(&id).cloned());

        assert_eq!(plan.sources, vec![SeedSource::History]);
        let planned = &plan.exercises[0];
        assert_eq!(planned.equipment, "Dumbbell");
        assert_eq!(planned.variation, "Incline");
        assert_eq!(reps_and_weights(planned), vec![(5, 30.0), (5, 32.5), (5, 0.0)]);
    }

    #[test]
    fn blank_history_equipment_becomes_sentinel() {
        let routine = vec![routine_exercise(A, 1, 5)];
        let plan = SessionBuilder::new(&routine).build(|_| Some(history_entry(" ", &[])));

        assert_eq!(plan.exercises[0].equipment, UNSPECIFIED);
        assert_eq!(reps_and_weights(&plan.exercises[0]), vec![(5, 0.0)]);
    }

    #[test]
    fn per_set_targets_fill_remaining_sets() {
        let routine = vec![RoutineExercise::new(
            A,
            "Squat",
            3,
            TargetReps::PerSet(vec![10, 8, 6]),
        )];
        let last = workout(vec![performed(A, &[(10, 100.0)])]);

        let exercises = build_session(&routine, Some(&last), |_| None);

        assert_eq!(
            reps_and_weights(&exercises[0]),
            vec![(10, 100.0), (8, 0.0), (6, 0.0)]
        );
        assert_eq!(exercises[0].name, "Squat");
    }

    #[test]
    fn inserted_routine_exercise_does_not_break_later_matches() {
        // A was added to the routine; the cursor stays on B and matches it next.
        let routine = vec![
            routine_exercise(A, 1, 5),
            routine_exercise(B, 1, 5),
            routine_exercise(C, 1, 5),
        ];
        let last = workout(vec![performed(B, &[(5, 40.0)]), performed(C, &[(5, 70.0)])]);

        let plan = SessionBuilder::new(&routine)
            .with_last_workout(Some(&last))
            .build(|_| None);

        assert_eq!(
            plan.sources,
            vec![SeedSource::Defaults, SeedSource::LastWorkout, SeedSource::LastWorkout]
        );
    }

    #[test]
    fn removed_routine_exercise_blocks_all_later_matches() {
        // X was dropped from the routine; the cursor never moves past it.
        let x = ExerciseId::new(99);
        let routine = vec![routine_exercise(A, 1, 5), routine_exercise(B, 1, 5)];
        let last = workout(vec![
            performed(x, &[(5, 10.0)]),
            performed(A, &[(5, 50.0)]),
            performed(B, &[(5, 60.0)]),
        ]);
        let mut consulted = Vec::new();

        let plan = SessionBuilder::new(&routine)
            .with_last_workout(Some(&last))
            .build(|id| {
                consulted.push(id);
                None
            });

        assert_eq!(plan.count(SeedSource::LastWorkout), 0);
        assert_eq!(consulted, vec![A, B]);
        assert!(plan.exercises.iter().all(|e| e.sets[0].weight == 0.0));
    }

    #[test]
    fn cursor_only_advances_on_match() {
        let last = workout(vec![performed(A, &[]), performed(B, &[])]);
        let mut cursor = LastWorkoutCursor::new(Some(&last));

        assert!(cursor.take_match(B).is_none());
        assert_eq!(cursor.position(), 0);
        assert!(cursor.take_match(A).is_some());
        assert!(cursor.take_match(B).is_some());
        assert_eq!(cursor.position(), 2);
        assert!(cursor.take_match(A).is_none());
    }

    #[test]
    fn zero_target_sets_yields_empty_set_list() {
        let routine = vec![routine_exercise(A, 0, 8)];
        let last = workout(vec![performed(A, &[(8, 50.0)])]);

        let exercises = build_session(&routine, Some(&last), |_| None);

        assert_eq!(exercises.len(), 1);
        assert!(exercises[0].sets.is_empty());
    }
}

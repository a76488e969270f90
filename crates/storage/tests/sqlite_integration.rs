use chrono::Duration;
use liftlog_core::model::{
    ExerciseId, ExerciseSets, NewWorkout, Routine, RoutineExercise, RoutineId, SessionId,
    TargetReps, UserId, WorkoutExercise, WorkoutSession, WorkoutSet,
};
use liftlog_core::time::{fixed_day, fixed_now};
use storage::repository::{
    ExerciseHistoryRepository, RoutineRepository, SessionRepository, WorkoutRepository,
};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn bench(weight: f64) -> WorkoutExercise {
    WorkoutExercise {
        exercise_id: ExerciseId::new(1),
        equipment: "Barbell".into(),
        variation: "Paused".into(),
        sets: vec![WorkoutSet::new(1, 8, weight), WorkoutSet::new(2, 6, weight)],
        name: "Bench Press".into(),
    }
}

#[tokio::test]
async fn sqlite_roundtrips_routines_with_per_set_targets() {
    let repo = connect("memdb_routines").await;
    let user = UserId::new(1);

    let routine = Routine::new(
        RoutineId::new(0),
        user,
        "Push",
        Some("heavy day".into()),
        vec![
            RoutineExercise::new(ExerciseId::new(1), "Bench Press", 3, vec![8, 6, 4]),
            RoutineExercise::new(ExerciseId::new(2), "Dips", 2, 12),
        ],
        fixed_now(),
    )
    .unwrap();
    let id = repo.insert_routine(&routine).await.unwrap();

    let fetched = repo.get_routine(user, id).await.unwrap();
    assert_eq!(fetched.id(), id);
    assert_eq!(fetched.name(), "Push");
    assert_eq!(fetched.description(), Some("heavy day"));
    assert_eq!(
        fetched.exercises()[0].target_reps,
        TargetReps::PerSet(vec![8, 6, 4])
    );
    assert_eq!(fetched.exercises()[1].target_reps, TargetReps::Uniform(12));

    let foreign = repo.get_routine(UserId::new(2), id).await.unwrap_err();
    assert!(foreign.is_not_found());
    assert_eq!(repo.list_routines(user).await.unwrap().len(), 1);
}

#[tokio::test]
async fn sqlite_returns_latest_workout_for_routine() {
    let repo = connect("memdb_workouts").await;
    let user = UserId::new(1);
    let routine = RoutineId::new(3);

    for (day, weight) in [(2, 62.5), (5, 65.0), (1, 60.0)] {
        repo.append_workout(NewWorkout {
            user_id: user,
            routine_id: routine,
            workout_date: fixed_day(day),
            exercises: vec![bench(weight)],
        })
        .await
        .unwrap();
    }

    let last = repo.last_workout_for_routine(user, routine).await.unwrap();
    assert_eq!(last.workout_date, fixed_day(5));
    assert_eq!(last.exercises[0].sets[0].weight, 65.0);
    assert_eq!(last.exercises[0].variation, "Paused");

    let none = repo
        .last_workout_for_routine(user, RoutineId::new(99))
        .await
        .unwrap_err();
    assert!(none.is_not_found());
}

#[tokio::test]
async fn sqlite_upsert_keeps_single_session_per_user() {
    let repo = connect("memdb_sessions").await;
    let user = UserId::new(7);

    let first = WorkoutSession::new(user, RoutineId::new(1), vec![bench(60.0)], fixed_now());
    let first_id = repo.upsert_session(&first).await.unwrap();

    let mut second = WorkoutSession::new(
        user,
        RoutineId::new(2),
        vec![bench(60.0), bench(70.0)],
        fixed_now(),
    );
    second
        .update_exercise(1, bench(72.5), fixed_now() + Duration::minutes(5))
        .unwrap();
    let second_id = repo.upsert_session(&second).await.unwrap();
    assert_eq!(first_id, second_id);

    let active = repo.get_session_for_user(user).await.unwrap();
    assert_eq!(active.id(), Some(second_id));
    assert_eq!(active.routine_id(), RoutineId::new(2));
    assert_eq!(active.exercise_index(), 1);
    assert_eq!(active.exercises()[1].sets[0].weight, 72.5);
    assert_eq!(active.last_update(), fixed_now() + Duration::minutes(5));

    repo.delete_session(second_id).await.unwrap();
    let gone = repo.get_session_for_user(user).await.unwrap_err();
    assert!(gone.is_not_found());
}

#[tokio::test]
async fn sqlite_history_appends_in_order() {
    let repo = connect("memdb_history").await;
    let (user, exercise) = (UserId::new(1), ExerciseId::new(1));

    let missing = repo.get_history(user, exercise).await.unwrap_err();
    assert!(missing.is_not_found());

    let first = ExerciseSets::from_exercise(&bench(60.0), fixed_day(0));
    let second = ExerciseSets::from_exercise(&bench(62.5), fixed_day(3));
    let id_a = repo.append_entry(user, exercise, &first).await.unwrap();
    let id_b = repo.append_entry(user, exercise, &second).await.unwrap();
    assert_eq!(id_a, id_b);

    let history = repo.get_history(user, exercise).await.unwrap();
    assert_eq!(history.id, id_a);
    assert_eq!(history.sets, vec![first, second.clone()]);
    assert_eq!(history.latest(), Some(&second));

    let other_user = repo.get_history(UserId::new(2), exercise).await.unwrap_err();
    assert!(other_user.is_not_found());
}

#[tokio::test]
async fn sqlite_completion_rolls_back_when_session_is_gone() {
    let repo = connect("memdb_completion").await;
    let user = UserId::new(3);
    let routine = RoutineId::new(4);
    let exercise = ExerciseId::new(1);
    let session = WorkoutSession::new(user, routine, vec![bench(80.0)], fixed_now());
    let session_id = repo.upsert_session(&session).await.unwrap();

    let done = || NewWorkout {
        user_id: user,
        routine_id: routine,
        workout_date: fixed_day(1),
        exercises: vec![bench(80.0)],
    };
    let history = vec![(
        exercise,
        ExerciseSets::from_exercise(&bench(80.0), fixed_day(1)),
    )];

    // The workout and history rows are written before the session delete
    // fails, so this exercises the rollback.
    let stale = repo
        .complete_session(SessionId::new(session_id.value() + 100), done(), &history)
        .await
        .unwrap_err();
    assert!(stale.is_not_found());
    let no_workout = repo.last_workout_for_routine(user, routine).await.unwrap_err();
    assert!(no_workout.is_not_found());
    let no_history = repo.get_history(user, exercise).await.unwrap_err();
    assert!(no_history.is_not_found());

    let workout = repo.complete_session(session_id, done(), &history).await.unwrap();
    let last = repo.last_workout_for_routine(user, routine).await.unwrap();
    assert_eq!(last.id, workout.id);
    assert_eq!(repo.get_history(user, exercise).await.unwrap().sets.len(), 1);
    let gone = repo.get_session_for_user(user).await.unwrap_err();
    assert!(gone.is_not_found());

    let replay = repo.complete_session(session_id, done(), &history).await.unwrap_err();
    assert!(replay.is_not_found());
    assert_eq!(repo.get_history(user, exercise).await.unwrap().sets.len(), 1);
}

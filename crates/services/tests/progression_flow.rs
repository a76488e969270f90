use chrono::Duration;
use liftlog_core::model::{ExerciseId, RoutineExercise, UserId, WorkoutExercise, WorkoutSet};
use liftlog_core::time::fixed_now;
use services::{AppServices, Clock, ProgressionSettings, SessionError};
use storage::repository::Storage;

const SQUAT: ExerciseId = ExerciseId::new(10);
const PRESS: ExerciseId = ExerciseId::new(11);
const STRETCH: ExerciseId = ExerciseId::new(99);

fn lifted(id: ExerciseId, reps: u32, weight: f64, sets: u32) -> WorkoutExercise {
    WorkoutExercise {
        exercise_id: id,
        equipment: "Barbell".into(),
        variation: "High bar".into(),
        sets: (1..=sets).map(|n| WorkoutSet::new(n, reps, weight)).collect(),
        name: String::new(),
    }
}

fn services_at(storage: &Storage, days: i64) -> AppServices {
    let settings = ProgressionSettings::default().with_cooldown(Some(STRETCH));
    AppServices::from_storage(
        storage,
        Clock::fixed(fixed_now() + Duration::days(days)),
        settings,
    )
}

#[tokio::test]
async fn two_workouts_progress_and_reseed_the_next_session() {
    let storage = Storage::sqlite("sqlite:file:memdb_progression_flow?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");
    let user = UserId::new(1);

    let day0 = services_at(&storage, 0);
    let routine_id = day0
        .routines()
        .create_routine(
            user,
            "Lower".into(),
            None,
            vec![
                RoutineExercise::new(SQUAT, "Squat", 3, 5),
                RoutineExercise::new(PRESS, "Press", 2, vec![8, 6]),
                RoutineExercise::new(STRETCH, "Stretch", 1, 1),
            ],
        )
        .await
        .expect("create routine");

    let sessions = day0.sessions();
    sessions.start_session(user, routine_id).await.expect("start");
    sessions
        .update_exercise(user, 0, lifted(SQUAT, 5, 100.0, 3))
        .await
        .expect("update squat");
    sessions
        .update_exercise(user, 1, lifted(PRESS, 8, 40.0, 2))
        .await
        .expect("update press");
    sessions.complete_session(user).await.expect("complete day 0");

    let day3 = services_at(&storage, 3);
    let next = day3
        .sessions()
        .start_session(user, routine_id)
        .await
        .expect("start day 3");
    assert_eq!(next.exercises()[0].sets[0].weight, 100.0);
    assert_eq!(next.exercises()[0].variation, "High bar");
    assert_eq!(next.exercises()[1].sets.len(), 2);

    day3.sessions()
        .update_exercise(user, 0, lifted(SQUAT, 5, 110.0, 3))
        .await
        .expect("update squat");
    day3.sessions()
        .complete_session(user)
        .await
        .expect("complete day 3");

    let series = day3.history().progress(user, SQUAT).await.expect("progress");
    assert_eq!(series.len(), 4);
    assert_eq!(series[0].weight, Some(100.0));
    assert_eq!(series[0].volume, Some(1500.0));
    assert!((series[1].interpolated_weight - 102.5).abs() < 1e-9);
    assert_eq!(series[3].weight, Some(110.0));

    let stretch = day3
        .history()
        .progress(user, STRETCH)
        .await
        .expect("stretch progress");
    assert!(stretch.is_empty());

    let err = day3.sessions().active_session(user).await.unwrap_err();
    assert!(matches!(err, SessionError::NoActiveSession));
}

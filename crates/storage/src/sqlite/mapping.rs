use chrono::{DateTime, Utc};
use liftlog_core::model::{
    ExerciseId, ExerciseSets, HistoryId, Routine, RoutineExercise, RoutineId, SessionId, UserId,
    Workout, WorkoutExercise, WorkoutId, WorkoutSession, WorkoutSet,
};
use serde::{Serialize, de::DeserializeOwned};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn id_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(ser)
}

pub(crate) fn from_json<T: DeserializeOwned>(
    field: &'static str,
    raw: &str,
) -> Result<T, StorageError> {
    serde_json::from_str(raw).map_err(|e| StorageError::Serialization(format!("{field}: {e}")))
}

fn get_u64(row: &sqlx::sqlite::SqliteRow, field: &'static str) -> Result<u64, StorageError> {
    i64_to_u64(field, row.try_get::<i64, _>(field).map_err(ser)?)
}

pub(crate) fn map_routine_row(row: &sqlx::sqlite::SqliteRow) -> Result<Routine, StorageError> {
    let exercises: Vec<RoutineExercise> =
        from_json("exercises", &row.try_get::<String, _>("exercises").map_err(ser)?)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(ser)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(ser)?;

    Routine::from_persisted(
        RoutineId::new(get_u64(row, "id")?),
        UserId::new(get_u64(row, "user_id")?),
        row.try_get::<String, _>("name").map_err(ser)?,
        row.try_get::<Option<String>, _>("description").map_err(ser)?,
        exercises,
        created_at,
        updated_at,
    )
    .map_err(ser)
}

pub(crate) fn map_workout_row(row: &sqlx::sqlite::SqliteRow) -> Result<Workout, StorageError> {
    let exercises: Vec<WorkoutExercise> =
        from_json("exercises", &row.try_get::<String, _>("exercises").map_err(ser)?)?;

    Ok(Workout {
        id: WorkoutId::new(get_u64(row, "id")?),
        user_id: UserId::new(get_u64(row, "user_id")?),
        routine_id: RoutineId::new(get_u64(row, "routine_id")?),
        workout_date: row.try_get("workout_date").map_err(ser)?,
        exercises,
    })
}

pub(crate) fn map_session_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<WorkoutSession, StorageError> {
    let exercises: Vec<WorkoutExercise> =
        from_json("exercises", &row.try_get::<String, _>("exercises").map_err(ser)?)?;
    let exercise_index = usize::try_from(get_u64(row, "exercise_index")?)
        .map_err(|_| StorageError::Serialization("exercise_index overflow".into()))?;

    WorkoutSession::from_persisted(
        SessionId::new(get_u64(row, "id")?),
        UserId::new(get_u64(row, "user_id")?),
        RoutineId::new(get_u64(row, "routine_id")?),
        exercises,
        exercise_index,
        row.try_get("last_update").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_history_entry_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<ExerciseSets, StorageError> {
    let workout_sets: Vec<WorkoutSet> = from_json(
        "workout_sets",
        &row.try_get::<String, _>("workout_sets").map_err(ser)?,
    )?;

    Ok(ExerciseSets {
        date: row.try_get("date").map_err(ser)?,
        equipment: row.try_get("equipment").map_err(ser)?,
        variation: row.try_get("variation").map_err(ser)?,
        workout_sets,
    })
}

pub(crate) fn history_id_from_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<(HistoryId, UserId, ExerciseId), StorageError> {
    Ok((
        HistoryId::new(get_u64(row, "id")?),
        UserId::new(get_u64(row, "user_id")?),
        ExerciseId::new(get_u64(row, "exercise_id")?),
    ))
}

use liftlog_core::model::{NewWorkout, RoutineId, UserId, Workout, WorkoutId};
use sqlx::SqliteConnection;

use super::SqliteRepository;
use super::mapping::{conn, id_to_i64, map_workout_row, to_json};
use crate::repository::{StorageError, WorkoutRepository};

/// Insert a workout on `db`, which may be a pooled connection or an open
/// transaction.
pub(super) async fn insert_workout(
    db: &mut SqliteConnection,
    workout: NewWorkout,
) -> Result<Workout, StorageError> {
    let res = sqlx::query(
        r"
            INSERT INTO workouts (user_id, routine_id, workout_date, exercises)
            VALUES (?1, ?2, ?3, ?4)
        ",
    )
    .bind(id_to_i64("user_id", workout.user_id.value())?)
    .bind(id_to_i64("routine_id", workout.routine_id.value())?)
    .bind(workout.workout_date)
    .bind(to_json(&workout.exercises)?)
    .execute(&mut *db)
    .await
    .map_err(conn)?;

    let id = u64::try_from(res.last_insert_rowid())
        .map_err(|_| StorageError::Serialization("workout id sign overflow".into()))?;
    Ok(workout.assign_id(WorkoutId::new(id)))
}

#[async_trait::async_trait]
impl WorkoutRepository for SqliteRepository {
    async fn append_workout(&self, workout: NewWorkout) -> Result<Workout, StorageError> {
        let mut db = self.pool.acquire().await.map_err(conn)?;
        insert_workout(&mut *db, workout).await
    }

    async fn last_workout_for_routine(
        &self,
        user_id: UserId,
        routine_id: RoutineId,
    ) -> Result<Workout, StorageError> {
        let row = sqlx::query(
            r"
                SELECT id, user_id, routine_id, workout_date, exercises
                FROM workouts
                WHERE user_id = ?1 AND routine_id = ?2
                ORDER BY workout_date DESC, id DESC
                LIMIT 1
            ",
        )
        .bind(id_to_i64("user_id", user_id.value())?)
        .bind(id_to_i64("routine_id", routine_id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        map_workout_row(&row)
    }
}

use liftlog_core::model::{
    ExerciseId, ExerciseSets, NewWorkout, SessionId, UserId, Workout, WorkoutSession,
};
use sqlx::Row;

use super::SqliteRepository;
use super::history_repo::insert_entry;
use super::mapping::{conn, id_to_i64, map_session_row, ser, to_json};
use super::workout_repo::insert_workout;
use crate::repository::{SessionRepository, StorageError};

#[async_trait::async_trait]
impl SessionRepository for SqliteRepository {
    async fn upsert_session(&self, session: &WorkoutSession) -> Result<SessionId, StorageError> {
        let exercise_index = i64::try_from(session.exercise_index())
            .map_err(|_| StorageError::Serialization("exercise_index overflow".into()))?;

        let row = sqlx::query(
            r"
                INSERT INTO sessions (user_id, routine_id, exercises, exercise_index, last_update)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(user_id) DO UPDATE SET
                    -- one active session per user, the row id survives overwrites
                    routine_id = excluded.routine_id,
                    exercises = excluded.exercises,
                    exercise_index = excluded.exercise_index,
                    last_update = excluded.last_update
                RETURNING id
            ",
        )
        .bind(id_to_i64("user_id", session.user_id().value())?)
        .bind(id_to_i64("routine_id", session.routine_id().value())?)
        .bind(to_json(session.exercises())?)
        .bind(exercise_index)
        .bind(session.last_update())
        .fetch_one(&self.pool)
        .await
        .map_err(conn)?;

        let id: i64 = row.try_get("id").map_err(ser)?;
        let id = u64::try_from(id).map_err(ser)?;
        Ok(SessionId::new(id))
    }

    async fn get_session_for_user(&self, user_id: UserId) -> Result<WorkoutSession, StorageError> {
        let row = sqlx::query(
            r"
                SELECT id, user_id, routine_id, exercises, exercise_index, last_update
                FROM sessions
                WHERE user_id = ?1
            ",
        )
        .bind(id_to_i64("user_id", user_id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        map_session_row(&row)
    }

    async fn delete_session(&self, session_id: SessionId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM sessions WHERE id = ?1")
            .bind(id_to_i64("session_id", session_id.value())?)
            .execute(&self.pool)
            .await
            .map_err(conn)?;
        Ok(())
    }

    async fn complete_session(
        &self,
        session_id: SessionId,
        workout: NewWorkout,
        history: &[(ExerciseId, ExerciseSets)],
    ) -> Result<Workout, StorageError> {
        let user_id = workout.user_id;
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let workout = insert_workout(&mut *tx, workout).await?;
        for (exercise_id, entry) in history {
            insert_entry(&mut *tx, user_id, *exercise_id, entry).await?;
        }

        let res = sqlx::query("DELETE FROM sessions WHERE id = ?1 AND user_id = ?2")
            .bind(id_to_i64("session_id", session_id.value())?)
            .bind(id_to_i64("user_id", user_id.value())?)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        if res.rows_affected() == 0 {
            // Dropping `tx` rolls back the workout and history rows.
            return Err(StorageError::NotFound);
        }

        tx.commit().await.map_err(conn)?;
        Ok(workout)
    }
}

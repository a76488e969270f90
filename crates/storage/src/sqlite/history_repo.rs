use liftlog_core::model::{ExerciseHistory, ExerciseId, ExerciseSets, HistoryId, UserId};
use sqlx::SqliteConnection;

use super::SqliteRepository;
use super::mapping::{conn, history_id_from_row, id_to_i64, map_history_entry_row, to_json};
use crate::repository::{ExerciseHistoryRepository, StorageError};

/// Append `entry` on `db`, creating the history document on first use.
pub(super) async fn insert_entry(
    db: &mut SqliteConnection,
    user_id: UserId,
    exercise_id: ExerciseId,
    entry: &ExerciseSets,
) -> Result<HistoryId, StorageError> {
    let user = id_to_i64("user_id", user_id.value())?;
    let exercise = id_to_i64("exercise_id", exercise_id.value())?;
    let workout_sets = to_json(&entry.workout_sets)?;

    sqlx::query(
        r"
            INSERT INTO exercise_history (user_id, exercise_id)
            VALUES (?1, ?2)
            ON CONFLICT(user_id, exercise_id) DO NOTHING
        ",
    )
    .bind(user)
    .bind(exercise)
    .execute(&mut *db)
    .await
    .map_err(conn)?;

    let row = sqlx::query(
        r"
            SELECT id, user_id, exercise_id
            FROM exercise_history
            WHERE user_id = ?1 AND exercise_id = ?2
        ",
    )
    .bind(user)
    .bind(exercise)
    .fetch_one(&mut *db)
    .await
    .map_err(conn)?;
    let (history_id, _, _) = history_id_from_row(&row)?;

    sqlx::query(
        r"
            INSERT INTO exercise_history_entries (history_id, date, equipment, variation, workout_sets)
            VALUES (?1, ?2, ?3, ?4, ?5)
        ",
    )
    .bind(id_to_i64("history_id", history_id.value())?)
    .bind(entry.date)
    .bind(&entry.equipment)
    .bind(&entry.variation)
    .bind(workout_sets)
    .execute(&mut *db)
    .await
    .map_err(conn)?;

    Ok(history_id)
}

#[async_trait::async_trait]
impl ExerciseHistoryRepository for SqliteRepository {
    async fn get_history(
        &self,
        user_id: UserId,
        exercise_id: ExerciseId,
    ) -> Result<ExerciseHistory, StorageError> {
        let row = sqlx::query(
            r"
                SELECT id, user_id, exercise_id
                FROM exercise_history
                WHERE user_id = ?1 AND exercise_id = ?2
            ",
        )
        .bind(id_to_i64("user_id", user_id.value())?)
        .bind(id_to_i64("exercise_id", exercise_id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        let (id, user_id, exercise_id) = history_id_from_row(&row)?;

        let rows = sqlx::query(
            r"
                SELECT date, equipment, variation, workout_sets
                FROM exercise_history_entries
                WHERE history_id = ?1
                ORDER BY id ASC
            ",
        )
        .bind(id_to_i64("history_id", id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut history = ExerciseHistory::new(id, user_id, exercise_id);
        for row in &rows {
            history.append(map_history_entry_row(row)?);
        }
        Ok(history)
    }

    async fn append_entry(
        &self,
        user_id: UserId,
        exercise_id: ExerciseId,
        entry: &ExerciseSets,
    ) -> Result<HistoryId, StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        let history_id = insert_entry(&mut *tx, user_id, exercise_id, entry).await?;
        tx.commit().await.map_err(conn)?;
        Ok(history_id)
    }
}

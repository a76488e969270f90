use liftlog_core::model::{Routine, RoutineId, UserId};

use super::SqliteRepository;
use super::mapping::{conn, id_to_i64, map_routine_row, to_json};
use crate::repository::{RoutineRepository, StorageError};

#[async_trait::async_trait]
impl RoutineRepository for SqliteRepository {
    async fn insert_routine(&self, routine: &Routine) -> Result<RoutineId, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO routines (user_id, name, description, exercises, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(id_to_i64("user_id", routine.user_id().value())?)
        .bind(routine.name())
        .bind(routine.description())
        .bind(to_json(routine.exercises())?)
        .bind(routine.created_at())
        .bind(routine.updated_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        let id = u64::try_from(res.last_insert_rowid())
            .map_err(|_| StorageError::Serialization("routine id sign overflow".into()))?;
        Ok(RoutineId::new(id))
    }

    async fn get_routine(
        &self,
        user_id: UserId,
        routine_id: RoutineId,
    ) -> Result<Routine, StorageError> {
        let row = sqlx::query(
            r"
                SELECT id, user_id, name, description, exercises, created_at, updated_at
                FROM routines
                WHERE id = ?1 AND user_id = ?2
            ",
        )
        .bind(id_to_i64("routine_id", routine_id.value())?)
        .bind(id_to_i64("user_id", user_id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?
        .ok_or(StorageError::NotFound)?;

        map_routine_row(&row)
    }

    async fn list_routines(&self, user_id: UserId) -> Result<Vec<Routine>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, user_id, name, description, exercises, created_at, updated_at
                FROM routines
                WHERE user_id = ?1
                ORDER BY id ASC
            ",
        )
        .bind(id_to_i64("user_id", user_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_routine_row).collect()
    }
}

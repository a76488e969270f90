use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

const SCHEMA_V1: &[&str] = &[
    r"
        CREATE TABLE IF NOT EXISTS routines (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            exercises TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS workouts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            routine_id INTEGER NOT NULL,
            workout_date TEXT NOT NULL,
            exercises TEXT NOT NULL
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL UNIQUE,
            routine_id INTEGER NOT NULL,
            exercises TEXT NOT NULL,
            exercise_index INTEGER NOT NULL CHECK (exercise_index >= 0),
            last_update TEXT NOT NULL
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS exercise_history (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            exercise_id INTEGER NOT NULL,
            UNIQUE (user_id, exercise_id)
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS exercise_history_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            history_id INTEGER NOT NULL,
            date TEXT NOT NULL,
            equipment TEXT NOT NULL,
            variation TEXT NOT NULL,
            workout_sets TEXT NOT NULL,
            FOREIGN KEY (history_id) REFERENCES exercise_history(id) ON DELETE CASCADE
        );
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_routines_user
            ON routines (user_id, id);
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_workouts_user_routine_date
            ON workouts (user_id, routine_id, workout_date);
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_sessions_last_update
            ON sessions (last_update);
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_history_entries_history
            ON exercise_history_entries (history_id, id);
    ",
];

/// Runs versioned migrations for the current schema.
///
/// Version 1 creates routines, workouts, sessions, exercise history and indexes.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        for statement in SCHEMA_V1 {
            sqlx::query(*statement).execute(&mut *tx).await?;
        }

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}

use async_trait::async_trait;
use liftlog_core::model::{
    ExerciseHistory, ExerciseId, ExerciseSets, HistoryId, NewWorkout, Routine, RoutineId,
    SessionId, UserId, Workout, WorkoutId, WorkoutSession,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StorageError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound)
    }
}

/// Repository contract for routines.
#[async_trait]
pub trait RoutineRepository: Send + Sync {
    /// Persist a new routine, ignoring its id, and return the assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the routine cannot be stored.
    async fn insert_routine(&self, routine: &Routine) -> Result<RoutineId, StorageError>;

    /// Fetch a routine owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing or owned by someone else.
    async fn get_routine(
        &self,
        user_id: UserId,
        routine_id: RoutineId,
    ) -> Result<Routine, StorageError>;

    /// List a user's routines ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the routines cannot be read.
    async fn list_routines(&self, user_id: UserId) -> Result<Vec<Routine>, StorageError>;
}

/// Repository contract for completed workouts. Workouts are append-only.
#[async_trait]
pub trait WorkoutRepository: Send + Sync {
    /// Record a completed workout and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the workout cannot be stored.
    async fn append_workout(&self, workout: NewWorkout) -> Result<Workout, StorageError>;

    /// Most recent workout (by `workout_date`) performed for a routine.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the routine was never completed.
    async fn last_workout_for_routine(
        &self,
        user_id: UserId,
        routine_id: RoutineId,
    ) -> Result<Workout, StorageError>;
}

/// Repository contract for the single active session per user.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Store `session` as the user's active session, replacing any previous
    /// one. The previous session's id is kept.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be stored.
    async fn upsert_session(&self, session: &WorkoutSession) -> Result<SessionId, StorageError>;

    /// Fetch the active session of a user.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the user has no session.
    async fn get_session_for_user(&self, user_id: UserId) -> Result<WorkoutSession, StorageError>;

    /// Remove a session. Removing a missing session is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    async fn delete_session(&self, session_id: SessionId) -> Result<(), StorageError>;

    /// Turn a session into a recorded workout in one atomic step: append
    /// `workout`, append each `(exercise, entry)` to the workout owner's
    /// history and delete the session. Either all of it is stored or none.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the session no longer exists for
    /// the workout's user, e.g. because it was already completed. Nothing is
    /// written in that case.
    async fn complete_session(
        &self,
        session_id: SessionId,
        workout: NewWorkout,
        history: &[(ExerciseId, ExerciseSets)],
    ) -> Result<Workout, StorageError>;
}

/// Repository contract for per-exercise history. Entries are append-only.
#[async_trait]
pub trait ExerciseHistoryRepository: Send + Sync {
    /// Fetch a user's history for one exercise, entries in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the exercise was never recorded.
    async fn get_history(
        &self,
        user_id: UserId,
        exercise_id: ExerciseId,
    ) -> Result<ExerciseHistory, StorageError>;

    /// Append one entry, creating the history document on first use.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the entry cannot be stored.
    async fn append_entry(
        &self,
        user_id: UserId,
        exercise_id: ExerciseId,
        entry: &ExerciseSets,
    ) -> Result<HistoryId, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    next_id: Arc<AtomicU64>,
    routines: Arc<Mutex<HashMap<RoutineId, Routine>>>,
    workouts: Arc<Mutex<Vec<Workout>>>,
    sessions: Arc<Mutex<HashMap<UserId, WorkoutSession>>>,
    histories: Arc<Mutex<HashMap<(UserId, ExerciseId), ExerciseHistory>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

fn poisoned<E: ToString>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl RoutineRepository for InMemoryRepository {
    async fn insert_routine(&self, routine: &Routine) -> Result<RoutineId, StorageError> {
        let id = RoutineId::new(self.allocate_id());
        let mut guard = self.routines.lock().map_err(poisoned)?;
        guard.insert(id, routine.clone().with_id(id));
        Ok(id)
    }

    async fn get_routine(
        &self,
        user_id: UserId,
        routine_id: RoutineId,
    ) -> Result<Routine, StorageError> {
        let guard = self.routines.lock().map_err(poisoned)?;
        guard
            .get(&routine_id)
            .filter(|r| r.user_id() == user_id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn list_routines(&self, user_id: UserId) -> Result<Vec<Routine>, StorageError> {
        let guard = self.routines.lock().map_err(poisoned)?;
        let mut routines: Vec<Routine> = guard
            .values()
            .filter(|r| r.user_id() == user_id)
            .cloned()
            .collect();
        routines.sort_by_key(Routine::id);
        Ok(routines)
    }
}

#[async_trait]
impl WorkoutRepository for InMemoryRepository {
    async fn append_workout(&self, workout: NewWorkout) -> Result<Workout, StorageError> {
        let workout = workout.assign_id(WorkoutId::new(self.allocate_id()));
        let mut guard = self.workouts.lock().map_err(poisoned)?;
        guard.push(workout.clone());
        Ok(workout)
    }

    async fn last_workout_for_routine(
        &self,
        user_id: UserId,
        routine_id: RoutineId,
    ) -> Result<Workout, StorageError> {
        let guard = self.workouts.lock().map_err(poisoned)?;
        guard
            .iter()
            .filter(|w| w.user_id == user_id && w.routine_id == routine_id)
            .max_by_key(|w| (w.workout_date, w.id))
            .cloned()
            .ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl SessionRepository for InMemoryRepository {
    async fn upsert_session(&self, session: &WorkoutSession) -> Result<SessionId, StorageError> {
        let mut guard = self.sessions.lock().map_err(poisoned)?;
        let id = match guard.get(&session.user_id()).and_then(WorkoutSession::id) {
            Some(existing) => existing,
            None => SessionId::new(self.allocate_id()),
        };
        guard.insert(session.user_id(), session.clone().with_id(id));
        Ok(id)
    }

    async fn get_session_for_user(&self, user_id: UserId) -> Result<WorkoutSession, StorageError> {
        let guard = self.sessions.lock().map_err(poisoned)?;
        guard.get(&user_id).cloned().ok_or(StorageError::NotFound)
    }

    async fn delete_session(&self, session_id: SessionId) -> Result<(), StorageError> {
        let mut guard = self.sessions.lock().map_err(poisoned)?;
        guard.retain(|_, s| s.id() != Some(session_id));
        Ok(())
    }

    async fn complete_session(
        &self,
        session_id: SessionId,
        workout: NewWorkout,
        history: &[(ExerciseId, ExerciseSets)],
    ) -> Result<Workout, StorageError> {
        // Lock order: sessions, workouts, histories.
        let mut sessions = self.sessions.lock().map_err(poisoned)?;
        let mut workouts = self.workouts.lock().map_err(poisoned)?;
        let mut histories = self.histories.lock().map_err(poisoned)?;

        let owned = sessions
            .get(&workout.user_id)
            .is_some_and(|s| s.id() == Some(session_id));
        if !owned {
            return Err(StorageError::NotFound);
        }
        sessions.remove(&workout.user_id);

        let workout = workout.assign_id(WorkoutId::new(self.allocate_id()));
        for (exercise_id, entry) in history {
            histories
                .entry((workout.user_id, *exercise_id))
                .or_insert_with(|| {
                    ExerciseHistory::new(
                        HistoryId::new(self.allocate_id()),
                        workout.user_id,
                        *exercise_id,
                    )
                })
                .append(entry.clone());
        }
        workouts.push(workout.clone());
        Ok(workout)
    }
}

#[async_trait]
impl ExerciseHistoryRepository for InMemoryRepository {
    async fn get_history(
        &self,
        user_id: UserId,
        exercise_id: ExerciseId,
    ) -> Result<ExerciseHistory, StorageError> {
        let guard = self.histories.lock().map_err(poisoned)?;
        guard
            .get(&(user_id, exercise_id))
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn append_entry(
        &self,
        user_id: UserId,
        exercise_id: ExerciseId,
        entry: &ExerciseSets,
    ) -> Result<HistoryId, StorageError> {
        let mut guard = self.histories.lock().map_err(poisoned)?;
        let history = guard.entry((user_id, exercise_id)).or_insert_with(|| {
            ExerciseHistory::new(HistoryId::new(self.allocate_id()), user_id, exercise_id)
        });
        history.append(entry.clone());
        Ok(history.id)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub routines: Arc<dyn RoutineRepository>,
    pub workouts: Arc<dyn WorkoutRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub histories: Arc<dyn ExerciseHistoryRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            routines: Arc::new(repo.clone()),
            workouts: Arc::new(repo.clone()),
            sessions: Arc::new(repo.clone()),
            histories: Arc::new(repo),
        }
    }
}

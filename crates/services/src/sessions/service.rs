use std::sync::Arc;

use tracing::{info, warn};

use liftlog_core::model::{RoutineId, UserId, Workout, WorkoutExercise, WorkoutSession};
use liftlog_core::planner::SeedSource;
use storage::repository::{
    RoutineRepository, SessionRepository, StorageError, WorkoutRepository,
};

use super::inputs::SessionInputs;
use crate::Clock;
use crate::error::SessionError;
use crate::history_service::HistoryService;
use crate::settings::ProgressionSettings;

/// Owns the lifecycle of a user's single active workout session.
#[derive(Clone)]
pub struct SessionService {
    clock: Clock,
    settings: ProgressionSettings,
    routines: Arc<dyn RoutineRepository>,
    workouts: Arc<dyn WorkoutRepository>,
    sessions: Arc<dyn SessionRepository>,
    history: HistoryService,
}

impl SessionService {
    #[must_use]
    pub fn new(
        clock: Clock,
        settings: ProgressionSettings,
        routines: Arc<dyn RoutineRepository>,
        workouts: Arc<dyn WorkoutRepository>,
        sessions: Arc<dyn SessionRepository>,
        history: HistoryService,
    ) -> Self {
        Self {
            clock,
            settings,
            routines,
            workouts,
            sessions,
            history,
        }
    }

    /// Plan a fresh session for `routine_id` and make it the user's active
    /// session, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::RoutineNotFound` if the routine does not exist
    /// for this user, or `SessionError::Storage` if reading the routine or
    /// last workout, or saving the session, fails. History read failures are
    /// not errors.
    pub async fn start_session(
        &self,
        user_id: UserId,
        routine_id: RoutineId,
    ) -> Result<WorkoutSession, SessionError> {
        let inputs = SessionInputs::load(
            user_id,
            routine_id,
            self.routines.as_ref(),
            self.workouts.as_ref(),
            &self.history,
        )
        .await?;
        let plan = inputs.plan();

        info!(
            user_id = %user_id,
            routine_id = %routine_id,
            exercises = plan.exercises.len(),
            from_last_workout = plan.count(SeedSource::LastWorkout),
            from_history = plan.count(SeedSource::History),
            from_defaults = plan.count(SeedSource::Defaults),
            "session planned"
        );

        let session = WorkoutSession::new(user_id, routine_id, plan.exercises, self.clock.now());
        let id = self.sessions.upsert_session(&session).await?;
        Ok(session.with_id(id))
    }

    /// The user's active session.
    ///
    /// A session idle for longer than the configured TTL is deleted and
    /// reported as missing.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoActiveSession` if there is none, or
    /// `SessionError::Storage` on repository failures.
    pub async fn active_session(&self, user_id: UserId) -> Result<WorkoutSession, SessionError> {
        let session = match self.sessions.get_session_for_user(user_id).await {
            Ok(session) => session,
            Err(StorageError::NotFound) => return Err(SessionError::NoActiveSession),
            Err(err) => return Err(err.into()),
        };

        if session.is_expired(self.clock.now(), self.settings.session_ttl()) {
            info!(
                user_id = %user_id,
                last_update = %session.last_update(),
                "dropping expired session"
            );
            if let Some(id) = session.id() {
                self.sessions.delete_session(id).await?;
            }
            return Err(SessionError::NoActiveSession);
        }

        Ok(session)
    }

    /// Replace the exercise at `index` of the active session with the
    /// athlete's edits and move the session cursor there.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::State` if `index` is out of range, plus the
    /// errors of [`SessionService::active_session`].
    pub async fn update_exercise(
        &self,
        user_id: UserId,
        index: usize,
        exercise: WorkoutExercise,
    ) -> Result<WorkoutSession, SessionError> {
        let mut session = self.active_session(user_id).await?;
        session.update_exercise(index, exercise, self.clock.now())?;
        self.sessions.upsert_session(&session).await?;
        Ok(session)
    }

    /// Turn the active session into a recorded workout, apply it to
    /// exercise history and drop the session.
    ///
    /// The workout, its history entries and the session removal are stored
    /// in one storage operation, so a failed completion leaves the session
    /// in place and can be retried without duplicating anything.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoActiveSession` if there is nothing to
    /// complete, including when the session was completed concurrently, or
    /// `SessionError::Storage` on repository failures.
    pub async fn complete_session(&self, user_id: UserId) -> Result<Workout, SessionError> {
        let session = self.active_session(user_id).await?;
        let session_id = session.id().ok_or(SessionError::NoActiveSession)?;
        let new_workout = session.to_new_workout(self.clock.now());
        let history = self.history.history_entries(&new_workout);

        let workout = match self
            .sessions
            .complete_session(session_id, new_workout, &history)
            .await
        {
            Ok(workout) => workout,
            Err(StorageError::NotFound) => return Err(SessionError::NoActiveSession),
            Err(err) => {
                warn!(
                    user_id = %user_id,
                    session_id = %session_id,
                    error = %err,
                    "session completion failed, session kept"
                );
                return Err(err.into());
            }
        };

        info!(
            user_id = %user_id,
            workout_id = %workout.id,
            exercises = workout.exercises.len(),
            history_entries = history.len(),
            "session completed"
        );
        Ok(workout)
    }
}

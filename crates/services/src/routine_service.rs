use std::sync::Arc;

use liftlog_core::model::{Routine, RoutineExercise, RoutineId, UserId};
use storage::repository::RoutineRepository;

use crate::Clock;
use crate::error::RoutineServiceError;

/// Creates and reads routines on behalf of a user.
#[derive(Clone)]
pub struct RoutineService {
    clock: Clock,
    routines: Arc<dyn RoutineRepository>,
}

impl RoutineService {
    #[must_use]
    pub fn new(clock: Clock, routines: Arc<dyn RoutineRepository>) -> Self {
        Self { clock, routines }
    }

    /// Validate and persist a new routine.
    ///
    /// # Errors
    ///
    /// Returns `RoutineServiceError::Routine` for validation failures.
    /// Returns `RoutineServiceError::Storage` if persistence fails.
    pub async fn create_routine(
        &self,
        user_id: UserId,
        name: String,
        description: Option<String>,
        exercises: Vec<RoutineExercise>,
    ) -> Result<RoutineId, RoutineServiceError> {
        let now = self.clock.now();
        let routine = Routine::new(RoutineId::new(0), user_id, name, description, exercises, now)?;
        let id = self.routines.insert_routine(&routine).await?;
        Ok(id)
    }

    /// Fetch one of the user's routines.
    ///
    /// # Errors
    ///
    /// Returns `RoutineServiceError::Storage` with `NotFound` if the routine
    /// does not exist or belongs to another user.
    pub async fn get_routine(
        &self,
        user_id: UserId,
        routine_id: RoutineId,
    ) -> Result<Routine, RoutineServiceError> {
        let routine = self.routines.get_routine(user_id, routine_id).await?;
        Ok(routine)
    }

    /// List the user's routines ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `RoutineServiceError::Storage` if repository access fails.
    pub async fn list_routines(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Routine>, RoutineServiceError> {
        let routines = self.routines.list_routines(user_id).await?;
        Ok(routines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftlog_core::model::{ExerciseId, RoutineError};
    use liftlog_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    #[tokio::test]
    async fn create_then_list_routines() {
        let svc = RoutineService::new(fixed_clock(), Arc::new(InMemoryRepository::new()));
        let user = UserId::new(1);

        let id = svc
            .create_routine(
                user,
                "Legs".into(),
                None,
                vec![RoutineExercise::new(ExerciseId::new(4), "Squat", 5, 5)],
            )
            .await
            .unwrap();

        let routine = svc.get_routine(user, id).await.unwrap();
        assert_eq!(routine.name(), "Legs");
        assert_eq!(svc.list_routines(user).await.unwrap().len(), 1);
        assert!(svc.list_routines(UserId::new(2)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_blank_name() {
        let svc = RoutineService::new(fixed_clock(), Arc::new(InMemoryRepository::new()));
        let err = svc
            .create_routine(UserId::new(1), "  ".into(), None, Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RoutineServiceError::Routine(RoutineError::EmptyName)
        ));
    }
}

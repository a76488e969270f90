use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::history_service::HistoryService;
use crate::routine_service::RoutineService;
use crate::sessions::SessionService;
use crate::settings::ProgressionSettings;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    routines: Arc<RoutineService>,
    sessions: Arc<SessionService>,
    history: Arc<HistoryService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        settings: ProgressionSettings,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, settings))
    }

    /// Build services over an already constructed storage bundle.
    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, settings: ProgressionSettings) -> Self {
        let history = HistoryService::new(settings.clone(), Arc::clone(&storage.histories));
        let sessions = Arc::new(SessionService::new(
            clock,
            settings,
            Arc::clone(&storage.routines),
            Arc::clone(&storage.workouts),
            Arc::clone(&storage.sessions),
            history.clone(),
        ));
        let routines = Arc::new(RoutineService::new(clock, Arc::clone(&storage.routines)));

        Self {
            routines,
            sessions,
            history: Arc::new(history),
        }
    }

    #[must_use]
    pub fn routines(&self) -> Arc<RoutineService> {
        Arc::clone(&self.routines)
    }

    #[must_use]
    pub fn sessions(&self) -> Arc<SessionService> {
        Arc::clone(&self.sessions)
    }

    #[must_use]
    pub fn history(&self) -> Arc<HistoryService> {
        Arc::clone(&self.history)
    }
}

#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod history_service;
pub mod routine_service;
pub mod sessions;
pub mod settings;

pub use liftlog_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, HistoryServiceError, RoutineServiceError, SessionError};
pub use history_service::HistoryService;
pub use routine_service::RoutineService;
pub use sessions::SessionService;
pub use settings::{DEFAULT_SESSION_TTL_HOURS, ProgressionSettings};

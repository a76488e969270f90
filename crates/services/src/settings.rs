use chrono::Duration;

use liftlog_core::model::ExerciseId;

/// Default inactivity window after which an unfinished session is dropped.
pub const DEFAULT_SESSION_TTL_HOURS: u32 = 48;

/// Runtime knobs shared by the session and history services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressionSettings {
    session_ttl: Duration,
    warmup_id: Option<ExerciseId>,
    cooldown_id: Option<ExerciseId>,
}

impl Default for ProgressionSettings {
    fn default() -> Self {
        Self {
            session_ttl: Duration::hours(i64::from(DEFAULT_SESSION_TTL_HOURS)),
            warmup_id: None,
            cooldown_id: None,
        }
    }
}

impl ProgressionSettings {
    #[must_use]
    pub fn with_session_ttl_hours(mut self, hours: u32) -> Self {
        self.session_ttl = Duration::hours(i64::from(hours));
        self
    }

    #[must_use]
    pub fn with_warmup(mut self, warmup_id: Option<ExerciseId>) -> Self {
        self.warmup_id = warmup_id;
        self
    }

    #[must_use]
    pub fn with_cooldown(mut self, cooldown_id: Option<ExerciseId>) -> Self {
        self.cooldown_id = cooldown_id;
        self
    }

    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    #[must_use]
    pub fn warmup_id(&self) -> Option<ExerciseId> {
        self.warmup_id
    }

    #[must_use]
    pub fn cooldown_id(&self) -> Option<ExerciseId> {
        self.cooldown_id
    }

    /// Warm-up and cool-down exercises never enter exercise history.
    #[must_use]
    pub fn is_excluded_from_history(&self, exercise_id: ExerciseId) -> bool {
        self.warmup_id == Some(exercise_id) || self.cooldown_id == Some(exercise_id)
    }
}

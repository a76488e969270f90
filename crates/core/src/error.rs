use thiserror::Error;

use crate::model::{RoutineError, SessionStateError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Routine(#[from] RoutineError),
    #[error(transparent)]
    SessionState(#[from] SessionStateError),
}

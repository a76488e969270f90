mod history;
mod ids;
mod routine;
mod session;
mod workout;

pub use ids::{ExerciseId, HistoryId, ParseIdError, RoutineId, SessionId, UserId, WorkoutId};

pub use history::{ExerciseHistory, ExerciseSets};
pub use routine::{MAX_TARGET_SETS, Routine, RoutineError, RoutineExercise, TargetReps};
pub use session::{SessionStateError, WorkoutSession};
pub use workout::{NewWorkout, UNSPECIFIED, Workout, WorkoutExercise, WorkoutSet};

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use liftlog_core::model::{
    ExerciseId, ExerciseSets, NewWorkout, Routine, RoutineExercise, RoutineId, UserId,
    WorkoutExercise, WorkoutSet,
};
use storage::repository::Storage;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    user_id: UserId,
    workouts: u32,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidUserId { raw: String },
    InvalidWorkouts { raw: String },
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidUserId { raw } => write!(f, "invalid --user value: {raw}"),
            ArgsError::InvalidWorkouts { raw } => write!(f, "invalid --workouts value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("LIFTLOG_DB_URL").unwrap_or_else(|_| "sqlite:liftlog.sqlite3".into());
        let mut user_id = std::env::var("LIFTLOG_USER_ID")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map_or_else(|| UserId::new(1), UserId::new);
        let mut workouts = std::env::var("LIFTLOG_SEED_WORKOUTS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(4);
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--user" => {
                    let value = require_value(&mut args, "--user")?;
                    user_id = value
                        .parse::<UserId>()
                        .map_err(|_| ArgsError::InvalidUserId { raw: value.clone() })?;
                }
                "--workouts" => {
                    let value = require_value(&mut args, "--workouts")?;
                    workouts = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidWorkouts { raw: value.clone() })?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            user_id,
            workouts,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:liftlog.sqlite3)");
    eprintln!("  --user <id>               User id owning the seeded data (default: 1)");
    eprintln!("  --workouts <n>            Completed workouts to append (default: 4)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  LIFTLOG_DB_URL, LIFTLOG_USER_ID, LIFTLOG_SEED_WORKOUTS");
}

/// (id, name, equipment, sets, reps, starting weight, increment per workout)
const SAMPLES: [(u64, &str, &str, u32, u32, f64, f64); 3] = [
    (1, "Bench Press", "Barbell", 3, 8, 60.0, 2.5),
    (2, "Barbell Row", "Barbell", 3, 10, 50.0, 2.5),
    (3, "Lateral Raise", "Dumbbell", 2, 15, 8.0, 1.0),
];

fn performed(workout_index: u32) -> impl Iterator<Item = WorkoutExercise> {
    SAMPLES
        .iter()
        .map(move |&(id, name, equipment, sets, reps, start, step)| {
            let weight = start + step * f64::from(workout_index);
            WorkoutExercise {
                exercise_id: ExerciseId::new(id),
                equipment: equipment.to_string(),
                variation: "None".to_string(),
                sets: (1..=sets).map(|n| WorkoutSet::new(n, reps, weight)).collect(),
                name: name.to_string(),
            }
        })
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let exercises = SAMPLES
        .iter()
        .map(|&(id, name, _, sets, reps, _, _)| {
            RoutineExercise::new(ExerciseId::new(id), name, sets, reps)
        })
        .collect();
    let routine = Routine::new(
        RoutineId::new(0),
        args.user_id,
        "Upper Body",
        Some("Seeded demo routine".into()),
        exercises,
        now,
    )?;
    let routine_id = storage.routines.insert_routine(&routine).await?;

    // Oldest first, so the last appended workout is the most recent one.
    for i in 0..args.workouts {
        let days_ago = i64::from(args.workouts - i) * 3;
        let workout_date = now - Duration::days(days_ago);
        let exercises: Vec<WorkoutExercise> = performed(i).collect();

        for exercise in &exercises {
            let entry = ExerciseSets::from_exercise(exercise, workout_date);
            storage
                .histories
                .append_entry(args.user_id, exercise.exercise_id, &entry)
                .await?;
        }

        storage
            .workouts
            .append_workout(NewWorkout {
                user_id: args.user_id,
                routine_id,
                workout_date,
                exercises,
            })
            .await?;
    }

    println!(
        "Seeded routine {} with {} workouts for user {} into {}",
        routine_id.value(),
        args.workouts,
        args.user_id,
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

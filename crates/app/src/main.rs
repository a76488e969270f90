use std::fmt;

use liftlog_core::model::{ExerciseId, RoutineId, UserId};
use serde::Serialize;
use services::{AppServices, Clock, DEFAULT_SESSION_TTL_HOURS, ProgressionSettings};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingFlag { flag: &'static str, command: &'static str },
    UnknownArg(String),
    InvalidId { flag: &'static str, raw: String },
    InvalidTtl { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFlag { flag, command } => {
                write!(f, "{command} requires {flag}")
            }
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidId { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidTtl { raw } => {
                write!(f, "invalid --session-ttl-hours value: {raw}")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
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

fn parse_id<T: std::str::FromStr>(flag: &'static str, raw: String) -> Result<T, ArgsError> {
    raw.parse::<T>().map_err(|_| ArgsError::InvalidId { flag, raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  liftlog session  --user <id> --routine <id> [options]");
    eprintln!("  liftlog show     --user <id> [options]");
    eprintln!("  liftlog complete --user <id> [options]");
    eprintln!("  liftlog progress --user <id> --exercise <id> [options]");
    eprintln!("  liftlog routines --user <id> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>          SQLite URL (default: sqlite:liftlog.sqlite3)");
    eprintln!(
        "  --session-ttl-hours <n>    Idle hours before a session expires (default: {DEFAULT_SESSION_TTL_HOURS})"
    );
    eprintln!("  --warmup-id <id>           Exercise kept out of history");
    eprintln!("  --cooldown-id <id>         Exercise kept out of history");
    eprintln!("  -v, --verbose              Debug logging (RUST_LOG overrides)");
    eprintln!("  -h, --help                 Show this help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!(
        "  LIFTLOG_DB_URL, LIFTLOG_USER_ID, LIFTLOG_SESSION_TTL_HOURS, LIFTLOG_WARMUP_ID, LIFTLOG_COOLDOWN_ID"
    );
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Session { routine_id: RoutineId },
    Show,
    Complete,
    Progress { exercise_id: ExerciseId },
    Routines,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandName {
    Session,
    Show,
    Complete,
    Progress,
    Routines,
}

impl CommandName {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "session" => Some(Self::Session),
            "show" => Some(Self::Show),
            "complete" => Some(Self::Complete),
            "progress" => Some(Self::Progress),
            "routines" => Some(Self::Routines),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::Show => "show",
            Self::Complete => "complete",
            Self::Progress => "progress",
            Self::Routines => "routines",
        }
    }
}

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    user_id: Option<UserId>,
    ttl_hours: u32,
    warmup_id: Option<ExerciseId>,
    cooldown_id: Option<ExerciseId>,
    verbose: bool,
}

impl Args {
    fn from_env() -> Self {
        let env = |key: &str| std::env::var(key).ok();
        Self {
            db_url: normalize_sqlite_url(
                env("LIFTLOG_DB_URL").unwrap_or_else(|| "sqlite:liftlog.sqlite3".into()),
            ),
            user_id: env("LIFTLOG_USER_ID").and_then(|v| v.parse().ok()),
            ttl_hours: env("LIFTLOG_SESSION_TTL_HOURS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SESSION_TTL_HOURS),
            warmup_id: env("LIFTLOG_WARMUP_ID").and_then(|v| v.parse().ok()),
            cooldown_id: env("LIFTLOG_COOLDOWN_ID").and_then(|v| v.parse().ok()),
            verbose: false,
        }
    }

    /// Apply command-line flags on top of `self` and resolve the command.
    fn parse(
        mut self,
        name: CommandName,
        args: &mut impl Iterator<Item = String>,
    ) -> Result<(Self, UserId, Command), ArgsError> {
        let mut routine_id: Option<RoutineId> = None;
        let mut exercise_id: Option<ExerciseId> = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    self.db_url = normalize_sqlite_url(value);
                }
                "--user" => {
                    let value = require_value(args, "--user")?;
                    self.user_id = Some(parse_id("--user", value)?);
                }
                "--routine" => {
                    let value = require_value(args, "--routine")?;
                    routine_id = Some(parse_id("--routine", value)?);
                }
                "--exercise" => {
                    let value = require_value(args, "--exercise")?;
                    exercise_id = Some(parse_id("--exercise", value)?);
                }
                "--session-ttl-hours" => {
                    let value = require_value(args, "--session-ttl-hours")?;
                    self.ttl_hours = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidTtl { raw: value.clone() })?;
                }
                "--warmup-id" => {
                    let value = require_value(args, "--warmup-id")?;
                    self.warmup_id = Some(parse_id("--warmup-id", value)?);
                }
                "--cooldown-id" => {
                    let value = require_value(args, "--cooldown-id")?;
                    self.cooldown_id = Some(parse_id("--cooldown-id", value)?);
                }
                "--verbose" | "-v" => self.verbose = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let missing = |flag| ArgsError::MissingFlag {
            flag,
            command: name.as_str(),
        };
        let user_id = self.user_id.ok_or_else(|| missing("--user"))?;
        let command = match name {
            CommandName::Session => Command::Session {
                routine_id: routine_id.ok_or_else(|| missing("--routine"))?,
            },
            CommandName::Show => Command::Show,
            CommandName::Complete => Command::Complete,
            CommandName::Progress => Command::Progress {
                exercise_id: exercise_id.ok_or_else(|| missing("--exercise"))?,
            },
            CommandName::Routines => Command::Routines,
        };

        Ok((self, user_id, command))
    }

    fn settings(&self) -> ProgressionSettings {
        ProgressionSettings::default()
            .with_session_ttl_hours(self.ttl_hours)
            .with_warmup(self.warmup_id)
            .with_cooldown(self.cooldown_id)
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);

    let name = match argv.next() {
        None => {
            print_usage();
            return Ok(());
        }
        Some(first) if first == "--help" || first == "-h" => {
            print_usage();
            return Ok(());
        }
        Some(first) => CommandName::from_arg(&first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    let (args, user_id, command) = Args::from_env().parse(name, &mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    init_tracing(args.verbose);
    debug!(db_url = %args.db_url, ttl_hours = args.ttl_hours, "starting");

    // Open + migrate SQLite here so core/services never touch the filesystem.
    prepare_sqlite_file(&args.db_url)?;
    let services = AppServices::new_sqlite(&args.db_url, Clock::default_clock(), args.settings())
        .await?;

    match command {
        Command::Session { routine_id } => {
            let session = services.sessions().start_session(user_id, routine_id).await?;
            print_json(&session)
        }
        Command::Show => {
            let session = services.sessions().active_session(user_id).await?;
            print_json(&session)
        }
        Command::Complete => {
            let workout = services.sessions().complete_session(user_id).await?;
            print_json(&workout)
        }
        Command::Progress { exercise_id } => {
            let series = services.history().progress(user_id, exercise_id).await?;
            print_json(&series)
        }
        Command::Routines => {
            let routines = services.routines().list_routines(user_id).await?;
            print_json(&routines)
        }
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

//! Operator command line for the time-tracking service.
//!
//! Usage:
//!
//! ```text
//! timetracking [--config <path>] [--log-level <level>] <command> [args]
//! ```
//!
//! Every command prints a JSON document on stdout. Client errors (bad input,
//! unknown user or task, rejected transitions) exit with status 2 and server
//! errors exit with status 1.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use mockable::{Clock, DefaultClock};
use serde_json::{Value, json};
use thiserror::Error;
use timetracking::config::{ConfigError, DEFAULT_CONFIG_FILE, DatabaseConfig};
use timetracking::store::adapters::postgres::{PostgresRecordStore, build_pool};
use timetracking::store::domain::{FieldMap, Page, user_columns};
use timetracking::store::ports::{RecordStore, StoreError};
use timetracking::telemetry::init_subscriber;
use timetracking::timetracking::domain::TaskId;
use timetracking::timetracking::services::{TimeTrackingError, TimeTrackingService};
use tracing::{Level, error, info_span};

#[derive(Debug, Parser)]
#[command(name = "timetracking", version, about = "Track employee effort on tasks")]
struct Cli {
    /// TOML configuration file; missing files are ignored.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log level used when `RUST_LOG` is unset.
    #[arg(long, default_value_t = Level::WARN)]
    log_level: Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Args)]
struct PassportArgs {
    /// Passport series.
    #[arg(long)]
    series: String,

    /// Passport number.
    #[arg(long)]
    number: String,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Register a user, or print the id of the existing one.
    CreateUser(PassportArgs),

    /// Print the user with the passport pair.
    FindUser(PassportArgs),

    /// Print users in id order.
    ListUsers {
        /// Maximum rows; zero means unbounded.
        #[arg(long, default_value_t = 0)]
        limit: usize,

        /// Rows to skip.
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },

    /// Change descriptive user columns.
    UpdateUser {
        #[command(flatten)]
        passport: PassportArgs,

        #[arg(long)]
        surname: Option<String>,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        patronymic: Option<String>,

        #[arg(long)]
        address: Option<String>,
    },

    /// Remove a user. Their tasks are kept.
    DeleteUser(PassportArgs),

    /// Open a work session on a task.
    BeginTask {
        #[command(flatten)]
        passport: PassportArgs,

        /// Task identifier.
        #[arg(long)]
        task: i32,
    },

    /// Close the open work session on a task.
    EndTask {
        #[command(flatten)]
        passport: PassportArgs,

        /// Task identifier.
        #[arg(long)]
        task: i32,
    },

    /// Report task costs for tasks scheduled inside a window.
    Cost {
        #[command(flatten)]
        passport: PassportArgs,

        /// Window start (RFC 3339).
        #[arg(long)]
        from: DateTime<Utc>,

        /// Window end (RFC 3339).
        #[arg(long)]
        to: DateTime<Utc>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to connect to the database: {0}")]
    Connect(#[source] StoreError),

    #[error(transparent)]
    Service(#[from] TimeTrackingError),

    #[error("failed to render output: {0}")]
    Render(#[from] serde_json::Error),
}

impl CliError {
    const fn exit_status(&self) -> u8 {
        match self {
            Self::Service(err) if err.kind().is_client_error() => 2,
            _ => 1,
        }
    }
}

fn descriptive_fields(
    surname: Option<String>,
    name: Option<String>,
    patronymic: Option<String>,
    address: Option<String>,
) -> FieldMap {
    [
        (user_columns::SURNAME, surname),
        (user_columns::NAME, name),
        (user_columns::PATRONYMIC, patronymic),
        (user_columns::ADDRESS, address),
    ]
    .into_iter()
    .filter_map(|(column, value)| value.map(|text| (column, text)))
    .collect()
}

async fn execute<S, C>(
    service: &TimeTrackingService<S, C>,
    command: Command,
) -> Result<Value, CliError>
where
    S: RecordStore,
    C: Clock + Send + Sync,
{
    let output = match command {
        Command::CreateUser(passport) => {
            let id = service
                .create_user(&passport.series, &passport.number)
                .await?;
            json!({ "id": id })
        }
        Command::FindUser(passport) => {
            let user = service
                .find_user_by_passport(&passport.series, &passport.number)
                .await?;
            serde_json::to_value(user)?
        }
        Command::ListUsers { limit, offset } => {
            let users = service
                .find_users_by_filter(&FieldMap::new(), Page::new(limit, offset))
                .await?;
            serde_json::to_value(users)?
        }
        Command::UpdateUser {
            passport,
            surname,
            name,
            patronymic,
            address,
        } => {
            let fields = descriptive_fields(surname, name, patronymic, address);
            service
                .update_info_user(&passport.series, &passport.number, &fields)
                .await?;
            json!({ "updated": fields.len() })
        }
        Command::DeleteUser(passport) => {
            service
                .delete_user(&passport.series, &passport.number)
                .await?;
            json!({ "deleted": true })
        }
        Command::BeginTask { passport, task } => {
            service
                .begin_task_for_user(&passport.series, &passport.number, TaskId::new(task))
                .await?;
            json!({ "task": task, "state": "active" })
        }
        Command::EndTask { passport, task } => {
            service
                .end_task_for_user(&passport.series, &passport.number, TaskId::new(task))
                .await?;
            json!({ "task": task, "state": "idle" })
        }
        Command::Cost { passport, from, to } => {
            let lines = service
                .calculate_cost_by_user(&passport.series, &passport.number, from, to)
                .await?;
            json!(lines)
        }
    };
    Ok(output)
}

async fn run(cli: Cli) -> Result<Value, CliError> {
    let config = DatabaseConfig::load(&cli.config)?;
    let url = config.connection_url();
    let pool_size = config.pool_size;
    let pool = tokio::task::spawn_blocking(move || build_pool(&url, pool_size))
        .await
        .map_err(|err| CliError::Connect(StoreError::persistence(err)))?
        .map_err(CliError::Connect)?;

    let service = TimeTrackingService::new(
        Arc::new(PostgresRecordStore::new(pool)),
        Arc::new(DefaultClock),
        info_span!("timetracking", database = %config.database),
    );
    execute(&service, cli.command).await
}

fn write_json(value: &Value) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_subscriber(cli.log_level);

    let (document, code) = match run(cli).await {
        Ok(output) => (output, ExitCode::SUCCESS),
        Err(err) => {
            error!(error = %err, "command failed");
            (json!({ "error": err.to_string() }), ExitCode::from(err.exit_status()))
        }
    };

    if let Err(err) = write_json(&document) {
        error!(error = %err, "failed to write output");
        return ExitCode::FAILURE;
    }
    code
}

//! Command-line transport over the reelshare record store.
//!
//! # Responsibility
//! - Map subcommands one-to-one onto `RecordStore` operations.
//! - Print results as JSON and map store error kinds to exit codes.

use clap::{Args, Parser, Subcommand};
use log::warn;
use reelshare_core::{
    init_logging, ErrorKind, ItemPayload, RecordStore, StoreConfig, StoreError, UserPayload,
};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "reelshare", version, about = "Manage shareable items and users")]
struct Cli {
    /// SQLite database file (defaults to REELSHARE_DB_PATH or the temp dir).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Item collection operations.
    #[command(subcommand)]
    Item(ItemCommand),
    /// User collection operations.
    #[command(subcommand)]
    User(UserCommand),
    /// Share an item with a user.
    Share { item_id: String, user_id: String },
    /// Print core liveness and version.
    Ping,
}

#[derive(Debug, Subcommand)]
enum ItemCommand {
    Create(ItemFields),
    Get { id: String },
    List,
    Update {
        id: String,
        #[command(flatten)]
        fields: ItemFields,
    },
    Delete { id: String },
}

#[derive(Debug, Args)]
struct ItemFields {
    #[arg(long)]
    title: String,
    #[arg(long)]
    description: String,
}

impl From<ItemFields> for ItemPayload {
    fn from(fields: ItemFields) -> Self {
        ItemPayload::new(fields.title, fields.description)
    }
}

#[derive(Debug, Subcommand)]
enum UserCommand {
    Add {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
    },
    Get { id: String },
    List,
    Delete { id: String },
}

/// Failure of one CLI invocation.
#[derive(Debug)]
enum CliError {
    Store(StoreError),
    Encode(serde_json::Error),
}

impl CliError {
    fn code(&self) -> &'static str {
        match self {
            Self::Store(err) => err.kind().code(),
            Self::Encode(_) => "encode",
        }
    }

    fn exit_code(&self) -> u8 {
        match self {
            Self::Store(err) => exit_code(err.kind()),
            Self::Encode(_) => 1,
        }
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode output: {err}"),
        }
    }
}

impl From<StoreError> for CliError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = resolve_config(&cli, StoreConfig::from_env());

    if let Some(log_dir) = config.log_dir.as_ref() {
        if let Err(err) = init_logging(&config.log_level, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    // Why: ping checks core wiring without opening the database.
    if matches!(cli.command, Command::Ping) {
        println!("{}", ping_line());
        return ExitCode::SUCCESS;
    }

    let outcome = RecordStore::open(&config.db_path)
        .map_err(CliError::from)
        .and_then(|store| run(&store, cli.command));
    match outcome {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            warn!(
                "event=cli_command module=cli status=error error_code={}",
                err.code()
            );
            let body = ErrorBody {
                error: err.code(),
                message: err.to_string(),
            };
            match serde_json::to_string(&body) {
                Ok(encoded) => eprintln!("{encoded}"),
                Err(_) => eprintln!("{}", body.message),
            }
            ExitCode::from(err.exit_code())
        }
    }
}

/// Applies CLI flag overrides on top of environment-derived settings.
fn resolve_config(cli: &Cli, mut config: StoreConfig) -> StoreConfig {
    if let Some(db) = cli.db.clone() {
        config.db_path = db;
    }
    if let Some(level) = cli.log_level.clone() {
        config.log_level = level;
    }
    if let Some(dir) = cli.log_dir.clone() {
        config.log_dir = Some(dir);
    }
    config
}

fn run(store: &RecordStore, command: Command) -> Result<String, CliError> {
    match command {
        Command::Item(ItemCommand::Create(fields)) => to_json(&store.create_item(fields.into())?),
        Command::Item(ItemCommand::Get { id }) => to_json(&store.get_item(&id)?),
        Command::Item(ItemCommand::List) => to_json(&store.list_items()?),
        Command::Item(ItemCommand::Update { id, fields }) => {
            to_json(&store.update_item(&id, fields.into())?)
        }
        Command::Item(ItemCommand::Delete { id }) => to_json(&store.delete_item(&id)?),
        Command::User(UserCommand::Add { username, email }) => {
            to_json(&store.add_user(UserPayload::new(username, email))?)
        }
        Command::User(UserCommand::Get { id }) => to_json(&store.get_user(&id)?),
        Command::User(UserCommand::List) => to_json(&store.list_users()?),
        Command::User(UserCommand::Delete { id }) => to_json(&store.delete_user(&id)?),
        Command::Share { item_id, user_id } => {
            let confirmation = store.share_item(&item_id, &user_id)?;
            to_json(&serde_json::json!({
                "message": confirmation.to_string(),
                "share": confirmation,
            }))
        }
        Command::Ping => Ok(ping_line()),
    }
}

fn ping_line() -> String {
    format!(
        "reelshare_core ping={} version={}",
        reelshare_core::ping(),
        reelshare_core::core_version()
    )
}

fn to_json(value: &impl Serialize) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::Storage => 1,
        ErrorKind::Validation => 2,
        ErrorKind::NotFound => 3,
        ErrorKind::Conflict => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        exit_code, ping_line, resolve_config, run, Cli, Command, ItemCommand, UserCommand,
    };
    use clap::{CommandFactory, Parser};
    use reelshare_core::{ErrorKind, RecordStore, StoreConfig};
    use std::path::PathBuf;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_environment_config() {
        let cli = Cli::parse_from(["reelshare", "--db", "/tmp/custom.db", "item", "list"]);
        let config = resolve_config(&cli, StoreConfig::default());
        assert_eq!(config.db_path, PathBuf::from("/tmp/custom.db"));
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn exit_codes_are_distinct_per_kind() {
        let codes = [
            exit_code(ErrorKind::Storage),
            exit_code(ErrorKind::Validation),
            exit_code(ErrorKind::NotFound),
            exit_code(ErrorKind::Conflict),
        ];
        for (index, code) in codes.iter().enumerate() {
            assert!(!codes[index + 1..].contains(code));
        }
    }

    #[test]
    fn run_dispatches_to_store_operations() {
        let store = RecordStore::open_in_memory().unwrap();

        let created = run(
            &store,
            Command::User(UserCommand::Add {
                username: "u".to_string(),
                email: "e".to_string(),
            }),
        )
        .unwrap();
        let user: serde_json::Value = serde_json::from_str(&created).unwrap();
        assert_eq!(user["username"], "u");

        let err = run(
            &store,
            Command::Item(ItemCommand::Get {
                id: "missing".to_string(),
            }),
        )
        .unwrap_err();
        assert_eq!(err.code(), "not_found");
        assert_eq!(err.exit_code(), exit_code(ErrorKind::NotFound));
    }

    #[test]
    fn ping_reports_core_version() {
        let store = RecordStore::open_in_memory().unwrap();
        let output = run(&store, Command::Ping).unwrap();

        assert_eq!(output, ping_line());
        assert!(output.contains(reelshare_core::core_version()));
    }
}

//! Purpose: `tableset` CLI entry point.
//! Role: Binary crate root; parses args, runs commands, emits JSON on stdout.
//! Invariants: Successful commands emit exactly one JSON document on stdout.
//! Invariants: Errors are emitted as JSON on stderr (text when stderr is a terminal).
//! Invariants: Process exit code is derived from `api::to_exit_code`.
#![allow(clippy::result_large_err)]
use std::error::Error as StdError;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint, error::ErrorKind as ClapErrorKind};
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

mod command_dispatch;
mod db_paths;
mod table_json;

use command_dispatch::dispatch_command;
use db_paths::{default_db_path, prepare_db_path};
use tableset::api::{Error, ErrorKind, Tableset, TablesetOptions, to_exit_code};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, Error> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Io)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(clap_error_summary(&err))
                    .with_hint("Run `tableset --help` for usage."));
            }
        },
    };

    init_tracing();

    let db = cli.db.unwrap_or_else(default_db_path);
    prepare_db_path(&db)?;
    let mut options = TablesetOptions::new();
    if let Some(sample_rows) = cli.sample_rows {
        options = options.with_sample_rows(sample_rows);
    }
    let tableset = Tableset::open(&db, options)?;
    dispatch_command(cli.command, &tableset)
}

#[derive(Parser)]
#[command(
    name = "tableset",
    version,
    about = "Load, cache and manage tables in a SQLite database",
    after_help = r#"EXAMPLES
  $ tableset load scores data/scores.csv
  $ tableset select 'SELECT year, avg(score) FROM scores GROUP BY year' --show
  $ tableset rename scores scores_2024
  $ tableset list

NOTES
  - Default database: ~/.tableset/tables.db (override with --db)
  - Select and clone results are temporary tables that last for one process
  - Logging: set RUST_LOG (default: warn), written to stderr"#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        help = "Database file (default: ~/.tableset/tables.db)",
        value_hint = ValueHint::FilePath
    )]
    db: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        help = "Rows sampled for column type inference during load (default: 1000)"
    )]
    sample_rows: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Load a .csv or .tsv file into a typed table")]
    Load {
        name: String,
        #[arg(value_hint = ValueHint::FilePath)]
        path: PathBuf,
        #[arg(long, help = "Treat the first line as data and name columns _1.._N")]
        no_header: bool,
    },
    #[command(about = "Register an existing table as authoritative")]
    Import { name: String },
    #[command(about = "Materialize a query result, reusing a cached table when possible")]
    Select {
        sql: String,
        #[arg(long, help = "Recompute even when a cached result exists")]
        no_reuse: bool,
        #[arg(long, help = "Include the result rows in the output")]
        show: bool,
        #[arg(long, requires = "show", help = "Maximum rows to show")]
        limit: Option<usize>,
    },
    #[command(name = "clone", about = "Copy a table into a new registered table")]
    CloneTable {
        name: String,
        #[arg(long, help = "Include the cloned rows in the output")]
        show: bool,
    },
    #[command(about = "Rename a table and its registry entry")]
    Rename { name: String, new_name: String },
    #[command(name = "drop", about = "Drop tables and their registry entries")]
    DropTables {
        #[arg(required = true)]
        names: Vec<String>,
    },
    #[command(
        about = "List registered tables",
        long_about = "List registered tables. `live` is false for placeholders and for \
                      select/clone results whose temporary table ended with an earlier process."
    )]
    List,
    #[command(about = "Show a table's columns and rows")]
    Show {
        name: String,
        #[arg(long, help = "Maximum rows to show")]
        limit: Option<usize>,
    },
    #[command(about = "Run SQL statements against the database")]
    Exec { sql: String },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn emit_json(value: Value) {
    let json = if io::stdout().is_terminal() {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("{}", error_text(err));
        return;
    }
    let json = serde_json::to_string(&error_json(err)).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    err.message()
        .map(str::to_string)
        .unwrap_or_else(|| format!("{:?}", err.kind()))
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut current = err.source();
    while let Some(source) = current {
        causes.push(source.to_string());
        current = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(table) = err.table() {
        inner.insert("table".to_string(), json!(table));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    if let Some(line) = err.line() {
        inner.insert("line".to_string(), json!(line));
    }
    if let (Some(expected), Some(actual)) = (err.expected(), err.actual()) {
        inner.insert("expected".to_string(), json!(expected));
        inner.insert("actual".to_string(), json!(actual));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error) -> String {
    let mut lines = vec![format!("error: {}", error_message(err))];
    if let Some(hint) = err.hint() {
        lines.push(format!("hint: {hint}"));
    }
    if let Some(table) = err.table() {
        lines.push(format!("table: {table}"));
    }
    if let Some(path) = err.path() {
        lines.push(format!("path: {}", path.display()));
    }
    if let Some(line) = err.line() {
        lines.push(format!("line: {line}"));
    }
    if let Some(cause) = error_causes(err).first() {
        lines.push(format!("caused by: {cause}"));
    }
    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

//! `taskcomplete` executable.
//!
//! # Responsibility
//! - Resolve configuration from flags and `TASKCOMPLETE_*` variables.
//! - Initialize logging once, then dispatch the subcommand.

use chrono::Utc;
use clap::{Parser, Subcommand};
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;
use taskcomplete_core::db::migrations::{applied_migrations, current_version, latest_version};
use taskcomplete_core::{
    default_log_level, init_logging, open_db, SessionRepository, SqliteSessionRepository,
};
use taskcomplete_web::{run_server, AppState, WebSettings};

#[derive(Parser)]
#[command(name = "taskcomplete")]
#[command(about = "Personal projects and tasks over HTTP")]
#[command(version)]
struct Cli {
    /// SQLite database file
    #[arg(long, env = "TASKCOMPLETE_DB", default_value = "taskcomplete.sqlite3")]
    db: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TASKCOMPLETE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rotating log files; stderr only when unset
    #[arg(long, env = "TASKCOMPLETE_LOG_DIR")]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web server
    Serve {
        /// Listen address
        #[arg(long, env = "TASKCOMPLETE_BIND", default_value = "127.0.0.1:8000")]
        bind: String,
    },
    /// Apply pending schema migrations and list the applied ones
    Migrate,
    /// Delete expired sessions
    Clearsessions,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    if let Err(err) = init_logging(level, cli.log_dir.as_deref()) {
        eprintln!("taskcomplete: {err}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={err:?}");
            eprintln!("taskcomplete: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let conn = open_db(&cli.db)
        .map_err(|err| format!("cannot open {}: {err}", cli.db.display()))?;

    match cli.command {
        Commands::Serve { bind } => {
            let state = AppState::new(conn, WebSettings::default());
            run_server(state, &bind)
                .await
                .map_err(|err| format!("server on {bind} failed: {err}"))
        }
        Commands::Migrate => {
            let version = current_version(&conn).map_err(|err| err.to_string())?;
            for row in applied_migrations(&conn).map_err(|err| err.to_string())? {
                println!("[X] {:04}_{} ({})", row.version, row.name, row.applied_at);
            }
            info!("event=migrate module=cli status=ok version={version}");
            println!("schema version {version} (latest {})", latest_version());
            Ok(())
        }
        Commands::Clearsessions => {
            let removed = SqliteSessionRepository::new(&conn)
                .purge_expired(Utc::now().timestamp())
                .map_err(|err| err.to_string())?;
            info!("event=clearsessions module=cli status=ok removed={removed}");
            println!("removed {removed} expired session(s)");
            Ok(())
        }
    }
}

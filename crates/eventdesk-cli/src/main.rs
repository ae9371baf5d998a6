//! eventdesk - terminal client for the event-management dashboards.
//!
//! Logs in against the backend, keeps the session between runs, and drives
//! the admin content CRUD and the participant "my events" view.

mod commands;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use eventdesk_core::config::Config;

#[derive(Parser)]
#[command(name = "eventdesk")]
#[command(about = "Event management from the terminal")]
#[command(
    after_help = "Environment:\n  EVENTDESK_API_URL    Backend base URL\n  EVENTDESK_LOGIN      Email or phone for login\n  EVENTDESK_PASSWORD   Password for login\n  RUST_LOG             Log filter (default: warn)"
)]
struct Cli {
    /// Backend base URL (overrides config and EVENTDESK_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Log in and remember the session
    Login {
        /// Email address or phone number
        #[arg(long)]
        login: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the current session
    Status,
    /// List records of a content type
    List {
        /// events, carousel, gallery, about-us, corporate, entertainment, concert, seminar, participants
        kind: String,
    },
    /// Show one record
    Get { kind: String, id: String },
    /// Create a record from key=value fields, with optional file uploads
    Create {
        kind: String,
        /// Field as key=value (repeatable)
        #[arg(long = "field", short = 'f')]
        fields: Vec<String>,
        /// File upload as field=path (repeatable)
        #[arg(long = "file")]
        files: Vec<String>,
    },
    /// Update a record
    Update {
        kind: String,
        id: String,
        #[arg(long = "field", short = 'f')]
        fields: Vec<String>,
        #[arg(long = "file")]
        files: Vec<String>,
    },
    /// Delete a record
    Delete { kind: String, id: String },
    /// Events you are registered for
    MyEvents {
        /// Include past events
        #[arg(long)]
        all: bool,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing(log_file: Option<&PathBuf>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            let name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "eventdesk.log".into());
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = init_tracing(cli.log_file.as_ref());

    let mut config = Config::load()?;
    // Command line beats both the config file and the environment
    let base_url = cli.api_url.unwrap_or_else(|| config.base_url());
    info!(base_url = %base_url, "eventdesk starting");

    commands::run(cli.command, &mut config, base_url).await
}

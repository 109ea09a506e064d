//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

/// Roamer - conversational trip planner
#[derive(Parser)]
#[command(
    name = "roamer",
    about = "Plan a trip by talking about it",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute (defaults to `chat`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Plan a trip interactively
    Chat {
        /// First message, e.g. "Lisbon for 4 days"
        initial: Option<String>,
    },

    /// Plan a trip from a single request, without follow-up questions
    Plan {
        /// The full trip request
        request: String,

        /// Also write the plan as markdown into this directory
        #[arg(short, long, value_name = "DIR")]
        save: Option<PathBuf>,

        /// Print the plan as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as YAML
    Config,
}

pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("roamer")
        .join("logs")
        .join("roamer.log");
    debug!(?path, "get_log_path: returning path");
    path
}

/// Generate the after_help text: API key status and log location
pub fn generate_after_help(api_key_env: &str) -> String {
    debug!(%api_key_env, "generate_after_help: called");
    let icon = if std::env::var(api_key_env).is_ok() {
        "\u{2705}"
    } else {
        "\u{274C}"
    };

    let mut help = String::new();
    help.push_str("API Key:\n");
    help.push_str(&format!("  {} {}\n\n", icon, api_key_env));
    help.push_str(&format!("Logs are written to: {}", get_log_path().display()));
    help
}

//! Roamer - conversational trip planner
//!
//! CLI entry point.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{CommandFactory, FromArgMatches};
use eyre::{Context, Result};
use tracing::{debug, info};

use roamer::cli::{Cli, Command, generate_after_help};
use roamer::config::Config;
use roamer::conversation::{ConversationState, TurnResult};
use roamer::display::render_plan;
use roamer::llm::create_client;
use roamer::planner::{PlannerConfig, TripPlanner};
use roamer::prompts::PromptLoader;
use roamer::repl;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("roamer")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("roamer.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let api_key_env = roamer::LlmConfig::default().api_key_env;
    let cmd = Cli::command().after_help(generate_after_help(&api_key_env));
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(provider = %config.llm.provider, model = %config.llm.model, "Roamer loaded config");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        None => {
            debug!("main: no subcommand, starting chat");
            repl::run_interactive(&config, None).await
        }
        Some(Command::Chat { initial }) => {
            debug!(?initial, "main: matched Chat command");
            repl::run_interactive(&config, initial).await
        }
        Some(Command::Plan { request, save, json }) => {
            debug!(?save, json, "main: matched Plan command");
            cmd_plan(&config, &request, save.as_deref(), json).await
        }
        Some(Command::Config) => {
            debug!("main: matched Config command");
            cmd_config(&config)
        }
    }
}

/// One-shot planning: a single turn, then plan if it is enough
async fn cmd_plan(config: &Config, request: &str, save: Option<&Path>, json: bool) -> Result<()> {
    config.validate()?;

    let llm = create_client(&config.llm).map_err(|e| eyre::eyre!("Failed to create LLM client: {}", e))?;
    let prompts = Arc::new(PromptLoader::new(config.prompts.dir.as_deref()));
    let mut state = ConversationState::new(llm.clone(), prompts.clone(), &config.tokens);

    let details = match state.step(request).await {
        TurnResult::Ready { details, .. } => details,
        TurnResult::NeedsMoreInfo {
            followup_question,
            missing_fields,
            ..
        } => {
            eprintln!("{}", followup_question);
            let missing: Vec<&str> = missing_fields.iter().map(|f| f.as_str()).collect();
            return Err(eyre::eyre!("Not enough to plan yet (missing: {})", missing.join(", ")));
        }
        TurnResult::Failed { kind, error } => {
            eprintln!("{}", error);
            return Err(eyre::eyre!("Could not read the trip request ({})", kind));
        }
    };

    let planner = TripPlanner::new(llm, prompts, PlannerConfig::from(&config.tokens));
    let plan = planner.plan(&details).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan).context("Failed to serialize plan")?);
    } else {
        println!("{}", render_plan(&plan));
    }

    if let Some(dir) = save {
        let path = plan.save_markdown(dir)?;
        eprintln!("Saved plan to {}", path.display());
    }

    Ok(())
}

fn cmd_config(config: &Config) -> Result<()> {
    let yaml = serde_yaml::to_string(config).context("Failed to serialize configuration")?;
    print!("{}", yaml);
    Ok(())
}

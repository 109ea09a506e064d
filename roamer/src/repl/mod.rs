//! Interactive REPL for Roamer
//!
//! Gathers a trip request over several turns, then plans and renders it.

mod session;

pub use session::ReplSession;

use std::sync::Arc;

use eyre::Result;

use crate::config::Config;
use crate::conversation::ConversationState;
use crate::llm::create_client;
use crate::planner::{PlannerConfig, TripPlanner};
use crate::prompts::PromptLoader;

/// Run the interactive REPL
///
/// This is the main entry point for `roamer chat`.
pub async fn run_interactive(config: &Config, initial: Option<String>) -> Result<()> {
    config.validate()?;

    let llm = create_client(&config.llm).map_err(|e| eyre::eyre!("Failed to create LLM client: {}", e))?;
    let prompts = Arc::new(PromptLoader::new(config.prompts.dir.as_deref()));

    let state = ConversationState::new(llm.clone(), prompts.clone(), &config.tokens);
    let planner = TripPlanner::new(llm, prompts, PlannerConfig::from(&config.tokens));

    let mut session = ReplSession::new(state, planner);
    session.run(initial).await
}

//! REPL session management

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, info};

use crate::conversation::{ConversationState, TripField, TurnResult};
use crate::display::render_plan;
use crate::planner::TripPlanner;

/// Interactive trip-planning session
///
/// Keeps the raw text of every turn for the current trip; each turn is
/// answered from the whole transcript, not just the latest line.
pub struct ReplSession {
    state: ConversationState,
    planner: TripPlanner,
    transcript: Vec<String>,
}

impl ReplSession {
    pub fn new(state: ConversationState, planner: TripPlanner) -> Self {
        Self {
            state,
            planner,
            transcript: Vec::new(),
        }
    }

    /// Run the REPL main loop
    pub async fn run(&mut self, initial: Option<String>) -> Result<()> {
        info!(session_id = %self.state.session_id(), "ReplSession::run: starting");
        self.print_welcome();

        if let Some(request) = initial {
            println!("{} {}", ">".bright_green(), request);
            println!("{}", self.respond(&request).await);
            println!();
        }

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            match rl.readline(&format!("{} ", ">".bright_green())) {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(input);

                    if input.starts_with('/') {
                        match self.handle_slash_command(input) {
                            SlashResult::Continue => continue,
                            SlashResult::Quit => break,
                        }
                    }

                    println!("{}", self.respond(input).await);
                    println!();
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Answer one line of traveler input with the text to show
    pub async fn respond(&mut self, input: &str) -> String {
        self.transcript.push(input.to_string());
        let utterance = self.transcript.join("\n");
        debug!(turns = self.transcript.len(), "ReplSession::respond: called");

        match self.state.step(&utterance).await {
            TurnResult::NeedsMoreInfo { followup_question, .. } => followup_question.bright_blue().to_string(),
            TurnResult::Failed { error, .. } => format!("{} {}", "Sorry!".yellow(), error),
            TurnResult::Ready { details, .. } => {
                println!("{}", "Great, planning your trip...".dimmed());
                let rendered = match self.planner.plan(&details).await {
                    Ok(plan) => render_plan(&plan),
                    Err(e) => format!("{} {}", "Sorry!".yellow(), e),
                };
                self.start_over();
                rendered
            }
        }
    }

    fn start_over(&mut self) {
        self.state.reset();
        self.transcript.clear();
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "Roamer - conversational trip planner".bright_cyan().bold());
        println!("Tell me where you'd like to go, for how long, and what you enjoy.");
        println!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
        println!();
    }

    fn handle_slash_command(&mut self, input: &str) -> SlashResult {
        let cmd = input.split_whitespace().next().unwrap_or("");

        match cmd {
            "/help" | "/h" => {
                self.print_help();
                SlashResult::Continue
            }
            "/quit" | "/q" | "/exit" => SlashResult::Quit,
            "/reset" => {
                self.start_over();
                println!("{}", "Starting over. Where would you like to go?".dimmed());
                SlashResult::Continue
            }
            "/fields" => {
                println!("{}", self.fields_report());
                SlashResult::Continue
            }
            "/history" => {
                println!("{}", self.history_report());
                SlashResult::Continue
            }
            _ => {
                println!("{} Unknown command: {}", "?".yellow(), cmd);
                println!("Type {} for available commands", "/help".yellow());
                SlashResult::Continue
            }
        }
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:14} Show this help", "/help".yellow());
        println!("  {:14} Exit", "/quit".yellow());
        println!("  {:14} Forget this trip and start over", "/reset".yellow());
        println!("  {:14} Show what I know about your trip", "/fields".yellow());
        println!("  {:14} Show what was asked and learned", "/history".yellow());
        println!();
    }

    fn fields_report(&self) -> String {
        let known = self.state.last_extracted();
        let mut lines = vec![format!("{}", "Trip so far:".bright_cyan())];
        for field in TripField::ALL {
            let value = known
                .display_value(field)
                .unwrap_or_else(|| "-".dimmed().to_string());
            lines.push(format!("  {:12} {}", field.as_str(), value));
        }
        lines.join("\n")
    }

    fn history_report(&self) -> String {
        let history = self.state.history();
        if history.is_empty() {
            return "No conversation history.".dimmed().to_string();
        }

        let mut lines = vec![format!("{}", "Conversation History:".bright_cyan())];
        for (i, entry) in history.iter().enumerate() {
            let label = match entry.about {
                Some(field) => format!("asked about {}", field),
                None => format!("learned {}", entry.field),
            };
            lines.push(format!("  {}. {}: {}", i + 1, label, entry.value));
        }
        lines.join("\n")
    }
}

/// Result of handling a slash command
enum SlashResult {
    Continue,
    Quit,
}

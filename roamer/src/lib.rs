//! Roamer - conversational trip planner
//!
//! Roamer gathers a traveler's intent over several turns, then asks a
//! generative text model for attractions, a day-by-day itinerary and local
//! transportation tips.
//!
//! # Core Concepts
//!
//! - **No Inference**: only fields the traveler stated are ever recorded
//! - **Fixed Gate**: location, then duration, then interests must be known
//! - **Full Transcript**: every turn re-reads everything said so far
//! - **Soft Failures**: a section that cannot be planned is reported, not fatal
//!
//! # Modules
//!
//! - [`llm`] - LLM client trait and OpenAI implementation
//! - [`prompts`] - Handlebars prompt templates
//! - [`conversation`] - Turn pipeline: extract, analyze, gate, follow up
//! - [`planner`] - Attractions, itinerary and transportation planning
//! - [`display`] - Terminal rendering of a plan
//! - [`repl`] - Interactive session
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod conversation;
pub mod display;
pub mod llm;
pub mod planner;
pub mod prompts;
pub mod repl;

// Re-export commonly used types
pub use config::{Config, LlmConfig, TokenConfig};
pub use conversation::{ConversationState, ErrorKind, TripField, TripFieldSet, TurnResult};
pub use llm::{LlmClient, LlmError};
pub use planner::{TripPlan, TripPlanner};

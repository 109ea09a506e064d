//! TripPlanner - turns a complete field set into a trip plan
//!
//! Runs attractions, then the itinerary built from those attractions, then
//! transportation. A failed section is left empty and reported in
//! [`TripPlan::errors`]; it never aborts the rest of the plan.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::types::TripPlan;
use super::validation::{
    ValidationError, validate_attractions, validate_itinerary, validate_transportation, validate_travel_details,
};
use crate::config::TokenConfig;
use crate::conversation::TripFieldSet;
use crate::llm::{CompletionRequest, JsonCallError, LlmClient, complete_json};
use crate::prompts::PromptLoader;

const SYSTEM_TRAVEL_GUIDE: &str = "You are a knowledgeable travel guide. Respond with valid JSON only.";
const SYSTEM_TRAVEL_PLANNER: &str = "You are an expert travel planner. Respond with valid JSON only.";
const SYSTEM_LOGISTIC_EXPERT: &str = "You are a travel logistics expert. Respond with valid JSON only.";

pub const PLAN_TEMPERATURE: f32 = 0.7;

/// Interests line used when the traveler gave none
const GENERAL_INTERESTS: &str = "general tourism";

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Cannot plan yet: {0}")]
    Incomplete(String),
}

/// Why one section of the plan could not be produced
#[derive(Debug, Error)]
enum SectionError {
    #[error(transparent)]
    Call(#[from] JsonCallError),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("{0}")]
    Prompt(String),
}

#[derive(Debug, Clone, Copy)]
enum Section {
    Attractions,
    Itinerary,
    Transport,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Attractions => f.write_str("Could not fetch attractions"),
            Section::Itinerary => f.write_str("Could not create itinerary"),
            Section::Transport => f.write_str("Could not fetch transportation"),
        }
    }
}

/// Token budgets for the planning calls
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub attraction_tokens: u32,
    pub itinerary_tokens: u32,
    pub transport_tokens: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self::from(&TokenConfig::default())
    }
}

impl From<&TokenConfig> for PlannerConfig {
    fn from(tokens: &TokenConfig) -> Self {
        Self {
            attraction_tokens: tokens.attraction,
            itinerary_tokens: tokens.itinerary,
            transport_tokens: tokens.transport,
        }
    }
}

pub struct TripPlanner {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptLoader>,
    config: PlannerConfig,
}

impl TripPlanner {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: Arc<PromptLoader>, config: PlannerConfig) -> Self {
        Self { llm, prompts, config }
    }

    /// Produce a plan; only missing location or duration is an error
    pub async fn plan(&self, details: &TripFieldSet) -> Result<TripPlan, PlanError> {
        debug!(summary = %details.summary(), "TripPlanner::plan: called");
        let (location, duration) = Self::check_details(details)?;
        info!(%location, duration, "Planning trip");

        let mut plan = TripPlan {
            details: details.clone(),
            ..TripPlan::default()
        };

        let interests = match details.interests.as_deref() {
            Some(i) if !i.is_empty() => i.join(", "),
            _ => GENERAL_INTERESTS.to_string(),
        };

        let attractions_raw = match self
            .section(
                "attractions",
                serde_json::json!({ "location": location, "duration": duration, "interests": interests }),
                SYSTEM_TRAVEL_GUIDE,
                self.config.attraction_tokens,
            )
            .await
        {
            Ok(value) => match validate_attractions(&value) {
                Ok(attractions) => {
                    plan.attractions = attractions;
                    value
                }
                Err(e) => {
                    Self::record(&mut plan, Section::Attractions, e.into());
                    serde_json::json!({ "attractions": [] })
                }
            },
            Err(e) => {
                Self::record(&mut plan, Section::Attractions, e);
                serde_json::json!({ "attractions": [] })
            }
        };

        let attractions_json =
            serde_json::to_string_pretty(&attractions_raw).unwrap_or_else(|_| attractions_raw.to_string());
        match self
            .section(
                "itinerary",
                serde_json::json!({ "location": location, "duration": duration, "attractions": attractions_json }),
                SYSTEM_TRAVEL_PLANNER,
                self.config.itinerary_tokens,
            )
            .await
            .and_then(|value| Ok(validate_itinerary(&value)?))
        {
            Ok(days) => plan.itinerary = days,
            Err(e) => Self::record(&mut plan, Section::Itinerary, e),
        }

        match self
            .section(
                "transport",
                serde_json::json!({ "location": location }),
                SYSTEM_LOGISTIC_EXPERT,
                self.config.transport_tokens,
            )
            .await
            .and_then(|value| Ok(validate_transportation(&value)?))
        {
            Ok(options) => plan.transport = options,
            Err(e) => Self::record(&mut plan, Section::Transport, e),
        }

        info!(
            attractions = plan.attractions.len(),
            days = plan.itinerary.len(),
            transport = plan.transport.len(),
            errors = plan.errors.len(),
            "Trip planned"
        );
        Ok(plan)
    }

    fn check_details(details: &TripFieldSet) -> Result<(String, u32), PlanError> {
        let raw = serde_json::to_value(details).map_err(|e| PlanError::Incomplete(e.to_string()))?;
        validate_travel_details(&raw).map_err(|e| PlanError::Incomplete(e.to_string()))?;

        let location = details
            .location
            .clone()
            .filter(|l| !l.trim().is_empty())
            .ok_or_else(|| PlanError::Incomplete("no destination".to_string()))?;
        let duration = details
            .duration
            .filter(|d| *d > 0)
            .ok_or_else(|| PlanError::Incomplete("no trip length".to_string()))?;
        Ok((location, duration))
    }

    async fn section(&self, template: &str, context: Value, system: &str, max_tokens: u32) -> Result<Value, SectionError> {
        debug!(%template, %max_tokens, "TripPlanner::section: called");
        let prompt = self
            .prompts
            .render(template, &context)
            .map_err(|e| SectionError::Prompt(e.to_string()))?;

        let request = CompletionRequest::single(system, prompt)
            .with_temperature(PLAN_TEMPERATURE)
            .with_max_tokens(max_tokens);

        Ok(complete_json(&self.llm, request).await?)
    }

    fn record(plan: &mut TripPlan, section: Section, error: SectionError) {
        warn!(%section, %error, "TripPlanner: section failed");
        plan.errors.push(format!("{}: {}", section, error));
    }
}

//! Followup Composer - one conversational question per turn

use std::sync::Arc;

use tracing::{debug, warn};

use super::analyzer::AnalysisResult;
use super::fields::{TripField, TripFieldSet};
use crate::llm::{CompletionRequest, LlmClient, complete_json};
use crate::prompts::PromptLoader;

const SYSTEM_PROMPT: &str = r#"You are a friendly travel assistant. Respond with JSON: {"question": "your question here"}"#;

/// Asked whenever phrasing fails or comes back blank
pub const FALLBACK_QUESTION: &str = "Could you tell me more about your trip?";

pub const FOLLOWUP_TEMPERATURE: f32 = 0.7;
pub const FOLLOWUP_MAX_TOKENS: u32 = 100;

/// Pick the field the next question should be about
///
/// First missing field in ask priority that has not been asked yet; when
/// every missing field was already asked, the first missing one again.
/// Location only when nothing else is missing.
pub fn next_target(analysis: &AnalysisResult, already_asked: &[String]) -> Option<TripField> {
    let asked = |f: &TripField| already_asked.iter().any(|a| a == f.as_str());
    let missing: Vec<TripField> = TripField::ASK_PRIORITY
        .into_iter()
        .filter(|f| analysis.missing.contains(f))
        .collect();

    missing
        .iter()
        .find(|f| !asked(f))
        .or_else(|| missing.first())
        .copied()
        .or_else(|| {
            analysis
                .missing
                .contains(&TripField::Location)
                .then_some(TripField::Location)
        })
}

pub struct FollowupComposer {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptLoader>,
}

impl FollowupComposer {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: Arc<PromptLoader>) -> Self {
        Self { llm, prompts }
    }

    /// Draft a question about the missing fields
    ///
    /// Empty iff the analysis reports nothing missing. Any failure yields
    /// [`FALLBACK_QUESTION`].
    pub async fn compose(&self, fields: &TripFieldSet, analysis: &AnalysisResult, already_asked: &[String]) -> String {
        debug!(missing = ?analysis.missing, ?already_asked, "FollowupComposer::compose: called");
        let Some(target) = next_target(analysis, already_asked) else {
            debug!("FollowupComposer::compose: nothing missing");
            return String::new();
        };

        let context = serde_json::json!({
            "known": fields.summary(),
            "missing": analysis.missing_names().join(", "),
            "already_asked": if already_asked.is_empty() {
                "nothing yet".to_string()
            } else {
                already_asked.join(", ")
            },
            "target": target.as_str(),
        });

        let prompt = match self.prompts.render("followup", &context) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "FollowupComposer::compose: prompt render failed");
                return FALLBACK_QUESTION.to_string();
            }
        };

        let request = CompletionRequest::single(SYSTEM_PROMPT, prompt)
            .with_temperature(FOLLOWUP_TEMPERATURE)
            .with_max_tokens(FOLLOWUP_MAX_TOKENS);

        match complete_json(&self.llm, request).await {
            Ok(value) => {
                let question = value.get("question").and_then(|q| q.as_str()).unwrap_or("").trim();
                if question.is_empty() {
                    warn!("FollowupComposer::compose: generated empty question");
                    FALLBACK_QUESTION.to_string()
                } else {
                    debug!(%question, %target, "FollowupComposer::compose: generated");
                    question.to_string()
                }
            }
            Err(e) => {
                warn!(error = %e, "FollowupComposer::compose: failed to generate question");
                FALLBACK_QUESTION.to_string()
            }
        }
    }
}

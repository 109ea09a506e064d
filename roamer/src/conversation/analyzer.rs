//! Completeness Analyzer - estimates which trip fields an utterance covers

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::fields::TripField;
use crate::llm::{CompletionRequest, LlmClient, complete_json};
use crate::prompts::PromptLoader;

const SYSTEM_PROMPT: &str = "You are a travel information analyst. Respond only with valid JSON.";

pub const ANALYZE_TEMPERATURE: f32 = 0.3;
pub const ANALYZE_MAX_TOKENS: u32 = 300;

/// Self-reported coverage of one utterance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    pub provided: BTreeSet<TripField>,
    pub missing: BTreeSet<TripField>,
    pub unclear: BTreeMap<TripField, String>,
    /// 0-100; informational only, never a gate
    pub confidence: u8,
}

impl AnalysisResult {
    /// Conservative result used whenever the analysis call fails
    pub fn fallback() -> Self {
        Self {
            missing: TripField::REQUIRED.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Decode a model payload, filling absent keys with empty defaults
    ///
    /// Returns `None` when the body is not a JSON object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;

        let fields_in = |key: &str| -> BTreeSet<TripField> {
            object
                .get(key)
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .filter_map(|name| name.parse().ok())
                        .collect()
                })
                .unwrap_or_default()
        };

        let unclear = object
            .get("unclear")
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .filter_map(|(name, why)| {
                        let field = name.parse::<TripField>().ok()?;
                        let why = match why {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        Some((field, why))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let confidence = object
            .get("confidence")
            .and_then(Value::as_f64)
            .map(|c| c.round().clamp(0.0, 100.0) as u8)
            .unwrap_or(0);

        Some(Self {
            provided: fields_in("provided"),
            missing: fields_in("missing"),
            unclear,
            confidence,
        })
    }

    /// Missing field names, in vocabulary order
    pub fn missing_names(&self) -> Vec<String> {
        self.missing.iter().map(|f| f.as_str().to_string()).collect()
    }
}

/// Runs the coverage analysis; never fails outward
pub struct Analyzer {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptLoader>,
}

impl Analyzer {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: Arc<PromptLoader>) -> Self {
        Self { llm, prompts }
    }

    pub async fn analyze(&self, utterance: &str) -> AnalysisResult {
        debug!(utterance_len = utterance.len(), "Analyzer::analyze: called");
        let prompt = match self
            .prompts
            .render("analyze", &serde_json::json!({ "utterance": utterance }))
        {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "Analyzer::analyze: prompt render failed, using fallback");
                return AnalysisResult::fallback();
            }
        };

        let request = CompletionRequest::single(SYSTEM_PROMPT, prompt)
            .with_temperature(ANALYZE_TEMPERATURE)
            .with_max_tokens(ANALYZE_MAX_TOKENS);

        let analysis = match complete_json(&self.llm, request).await {
            Ok(value) => AnalysisResult::from_value(&value).unwrap_or_else(|| {
                warn!("Analyzer::analyze: response is not an object, using fallback");
                AnalysisResult::fallback()
            }),
            Err(e) => {
                warn!(error = %e, "Analyzer::analyze: analysis failed, using fallback");
                AnalysisResult::fallback()
            }
        };

        debug!(?analysis, "Analyzer::analyze: done");
        analysis
    }
}

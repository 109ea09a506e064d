//! Conversation State - the turn pipeline and what it remembers

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::analyzer::{AnalysisResult, Analyzer};
use super::error::{ConversationError, ErrorKind};
use super::extractor::{FieldExtractor, require_location};
use super::fields::{TripField, TripFieldSet};
use super::followup::{FollowupComposer, next_target};
use super::gate::decide;
use crate::config::TokenConfig;
use crate::llm::LlmClient;
use crate::prompts::PromptLoader;

/// History field name of an ask event
pub const QUESTION_ENTRY: &str = "question";

/// One append-only record of something asked or learned
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub field: String,
    pub value: String,
    /// The trip field a question targeted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<TripField>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Gathering,
    Ready,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionPhase::Gathering => f.write_str("gathering"),
            SessionPhase::Ready => f.write_str("ready"),
        }
    }
}

/// Outcome of one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnResult {
    /// `missing_fields` is the analyzer's list plus any required field the
    /// extraction still lacks, so it can be wider than the raw analysis.
    NeedsMoreInfo {
        details: TripFieldSet,
        followup_question: String,
        missing_fields: BTreeSet<TripField>,
        confidence: u8,
    },
    Ready {
        details: TripFieldSet,
        confidence: u8,
    },
    Failed {
        kind: ErrorKind,
        /// Conversational text, safe to show as-is
        error: String,
    },
}

impl TurnResult {
    fn failed(err: &ConversationError) -> Self {
        TurnResult::Failed {
            kind: err.kind(),
            error: err.user_message(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, TurnResult::Ready { .. })
    }
}

/// Owns one planning session: history, accumulated fields and the agents
///
/// Not safe for overlapping turns; `step` takes `&mut self`, so callers
/// serialize access by construction.
pub struct ConversationState {
    session_id: Uuid,
    phase: SessionPhase,
    turns: u32,
    history: Vec<HistoryEntry>,
    accumulated: TripFieldSet,
    last_extracted: TripFieldSet,
    extractor: FieldExtractor,
    analyzer: Analyzer,
    composer: FollowupComposer,
}

impl ConversationState {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: Arc<PromptLoader>, tokens: &TokenConfig) -> Self {
        let session_id = Uuid::now_v7();
        debug!(%session_id, "ConversationState::new: called");
        Self {
            session_id,
            phase: SessionPhase::Gathering,
            turns: 0,
            history: Vec::new(),
            accumulated: TripFieldSet::new(),
            last_extracted: TripFieldSet::new(),
            extractor: FieldExtractor::new(llm.clone(), prompts.clone(), tokens.parsing),
            analyzer: Analyzer::new(llm.clone(), prompts.clone()),
            composer: FollowupComposer::new(llm, prompts),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn turns(&self) -> u32 {
        self.turns
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Fields stored when the gate last let the session proceed
    pub fn accumulated(&self) -> &TripFieldSet {
        &self.accumulated
    }

    /// Fields from the latest successful extraction, in any phase
    pub fn last_extracted(&self) -> &TripFieldSet {
        &self.last_extracted
    }

    /// The frozen field set, only once the session is ready to plan
    pub fn accumulated_fields(&self) -> Option<&TripFieldSet> {
        match self.phase {
            SessionPhase::Ready => Some(&self.accumulated),
            SessionPhase::Gathering => None,
        }
    }

    pub fn add_to_history(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.push_entry(field.into(), value.into(), None);
    }

    fn push_entry(&mut self, field: String, value: String, about: Option<TripField>) {
        debug!(session_id = %self.session_id, %field, ?about, "ConversationState::push_entry: called");
        self.history.push(HistoryEntry { field, value, about });
    }

    /// Trip fields already asked about or learned, first-seen order
    pub fn already_asked(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for entry in &self.history {
            let name = if entry.field == QUESTION_ENTRY {
                entry.about.map(|f| f.as_str().to_string())
            } else {
                entry.field.parse::<TripField>().ok().map(|f| f.as_str().to_string())
            };
            if let Some(name) = name
                && !names.contains(&name)
            {
                names.push(name);
            }
        }
        names
    }

    /// Clear history and accumulated fields, back to gathering
    pub fn reset(&mut self) {
        info!(session_id = %self.session_id, turns = self.turns, "ConversationState::reset: called");
        self.history.clear();
        self.accumulated = TripFieldSet::new();
        self.last_extracted = TripFieldSet::new();
        self.phase = SessionPhase::Gathering;
        self.turns = 0;
    }

    /// Run one full turn over the complete utterance text so far
    pub async fn step(&mut self, utterance: &str) -> TurnResult {
        debug!(session_id = %self.session_id, phase = %self.phase, "ConversationState::step: called");
        if self.phase == SessionPhase::Ready {
            warn!(session_id = %self.session_id, "ConversationState::step: session already complete");
            return TurnResult::failed(&ConversationError::Pipeline(
                "this trip is already planned, start over to plan another".to_string(),
            ));
        }

        self.turns += 1;
        let turn = self.turns;

        let extracted = self.extractor.extract(utterance).await.and_then(require_location);
        let analysis = self.analyzer.analyze(utterance).await;

        let fields = match extracted {
            Ok(fields) => fields,
            Err(e) => {
                warn!(session_id = %self.session_id, turn, kind = %e.kind(), error = %e, "ConversationState::step: extraction failed");
                return TurnResult::failed(&e);
            }
        };

        self.record_learned(&fields);
        self.last_extracted = fields.clone();

        let decision = decide(&fields, &analysis);
        if decision.proceed {
            self.accumulated = fields.clone();
            self.phase = SessionPhase::Ready;
            info!(session_id = %self.session_id, turn, summary = %fields.summary(), "ConversationState::step: ready to plan");
            return TurnResult::Ready {
                details: fields,
                confidence: analysis.confidence,
            };
        }

        debug!(session_id = %self.session_id, turn, reason = %decision.reason, "ConversationState::step: need more info");
        let analysis = with_gate_gaps(analysis, &fields);
        let already_asked = self.already_asked();
        let target = next_target(&analysis, &already_asked);
        let question = self.composer.compose(&fields, &analysis, &already_asked).await;
        self.push_entry(QUESTION_ENTRY.to_string(), question.clone(), target);

        TurnResult::NeedsMoreInfo {
            details: fields,
            followup_question: question,
            missing_fields: analysis.missing,
            confidence: analysis.confidence,
        }
    }

    /// Append a learned entry per field whose value changed since last seen
    fn record_learned(&mut self, fields: &TripFieldSet) {
        for field in fields.present() {
            let Some(value) = fields.display_value(field) else {
                continue;
            };
            let known = self
                .history
                .iter()
                .rev()
                .find(|e| e.field == field.as_str())
                .is_some_and(|e| e.value == value);
            if !known {
                self.push_entry(field.as_str().to_string(), value, None);
            }
        }
    }
}

/// Make sure every required field the fields lack is listed as missing
fn with_gate_gaps(mut analysis: AnalysisResult, fields: &TripFieldSet) -> AnalysisResult {
    for field in TripField::REQUIRED {
        if !fields.contains(field) {
            analysis.missing.insert(field);
        }
    }
    if fields.duration == Some(0) {
        analysis.missing.insert(TripField::Duration);
    }
    if fields.interests.as_ref().is_some_and(|i| i.is_empty()) {
        analysis.missing.insert(TripField::Interests);
    }
    analysis.provided.retain(|f| !analysis.missing.contains(f));
    analysis
}

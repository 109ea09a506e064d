//! Conversation core
//!
//! Decides turn by turn whether enough has been gathered to plan a trip:
//!
//! ```text
//! utterance -> FieldExtractor ─┐
//!           -> Analyzer ───────┴-> gate::decide -> proceed: Ready
//!                                              └-> hold: FollowupComposer -> NeedsMoreInfo
//! ```
//!
//! Every turn re-reads the full transcript; [`ConversationState`] overwrites
//! its accumulated fields rather than merging them.

mod analyzer;
mod error;
mod extractor;
mod fields;
mod followup;
mod gate;
mod state;

pub use analyzer::{AnalysisResult, Analyzer};
pub use error::{ConversationError, ErrorKind};
pub use extractor::{FieldExtractor, decode_fields, require_location};
pub use fields::{TripField, TripFieldSet};
pub use followup::{FALLBACK_QUESTION, FollowupComposer, next_target};
pub use gate::{GateDecision, NEED_DESTINATION, NEED_INTERESTS, NEED_TRIP_LENGTH, decide};
pub use state::{ConversationState, HistoryEntry, SessionPhase, TurnResult};

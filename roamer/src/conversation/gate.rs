//! Gate - the minimum-viable-plan policy

use tracing::debug;

use super::analyzer::AnalysisResult;
use super::fields::TripFieldSet;

pub const NEED_DESTINATION: &str = "need destination";
pub const NEED_TRIP_LENGTH: &str = "need trip length";
pub const NEED_INTERESTS: &str = "need interests";

/// Whether to start planning; `reason` is empty iff `proceed`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateDecision {
    pub proceed: bool,
    pub reason: String,
}

impl GateDecision {
    fn go() -> Self {
        Self {
            proceed: true,
            reason: String::new(),
        }
    }

    fn hold(reason: &str) -> Self {
        Self {
            proceed: false,
            reason: reason.to_string(),
        }
    }
}

/// Check location, duration, interests in that order; first gap wins
///
/// The analysis is accepted for symmetry with the rest of the turn but its
/// confidence never blocks progress.
pub fn decide(fields: &TripFieldSet, analysis: &AnalysisResult) -> GateDecision {
    debug!(summary = %fields.summary(), confidence = analysis.confidence, "decide: called");

    let has_location = fields.location.as_deref().is_some_and(|l| !l.trim().is_empty());
    if !has_location {
        return GateDecision::hold(NEED_DESTINATION);
    }

    if !fields.duration.is_some_and(|d| d > 0) {
        return GateDecision::hold(NEED_TRIP_LENGTH);
    }

    if !fields.interests.as_ref().is_some_and(|i| !i.is_empty()) {
        return GateDecision::hold(NEED_INTERESTS);
    }

    GateDecision::go()
}

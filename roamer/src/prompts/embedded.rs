//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Travel-detail extraction prompt
pub const EXTRACT: &str = include_str!("../../prompts/extract.pmt");

/// Completeness analysis prompt
pub const ANALYZE: &str = include_str!("../../prompts/analyze.pmt");

/// Follow-up question prompt
pub const FOLLOWUP: &str = include_str!("../../prompts/followup.pmt");

/// Attraction recommendation prompt
pub const ATTRACTIONS: &str = include_str!("../../prompts/attractions.pmt");

/// Day-by-day itinerary prompt
pub const ITINERARY: &str = include_str!("../../prompts/itinerary.pmt");

/// Local transportation prompt
pub const TRANSPORT: &str = include_str!("../../prompts/transport.pmt");

/// Names of every embedded template
pub const NAMES: [&str; 6] = ["extract", "analyze", "followup", "attractions", "itinerary", "transport"];

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "extract" => Some(EXTRACT),
        "analyze" => Some(ANALYZE),
        "followup" => Some(FOLLOWUP),
        "attractions" => Some(ATTRACTIONS),
        "itinerary" => Some(ITINERARY),
        "transport" => Some(TRANSPORT),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}

//! Structured-output helpers
//!
//! Models asked for JSON still like to wrap it in a fenced code block, so
//! every structured call goes through [`strip_code_fence`] before parsing.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use super::{CompletionRequest, LlmClient, LlmError};

/// Failure of a structured (JSON) completion call
#[derive(Debug, Error)]
pub enum JsonCallError {
    /// The backend was unreachable, errored, or returned empty content
    #[error(transparent)]
    Service(#[from] LlmError),

    /// The backend answered, but not with parseable JSON
    #[error("Invalid JSON from API: {0}")]
    Malformed(String),
}

/// Remove a surrounding markdown code fence (```` ``` ```` or ```` ```json ````)
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }

    let inner = trimmed.trim_matches('`').trim_start();
    let inner = match inner.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => &inner[4..],
        _ => inner,
    };
    inner.trim()
}

/// Parse a raw model response as JSON after unwrapping any code fence
pub fn parse_json_response(raw: &str) -> Result<serde_json::Value, JsonCallError> {
    if raw.trim().is_empty() {
        return Err(JsonCallError::Service(LlmError::EmptyResponse));
    }

    let cleaned = strip_code_fence(raw);
    serde_json::from_str(cleaned).map_err(|e| {
        let preview: String = raw.chars().take(200).collect();
        warn!(line = e.line(), column = e.column(), %preview, "parse_json_response: invalid JSON");
        JsonCallError::Malformed(e.to_string())
    })
}

/// Run a structured completion and decode its body as JSON
pub async fn complete_json(
    llm: &Arc<dyn LlmClient>,
    request: CompletionRequest,
) -> Result<serde_json::Value, JsonCallError> {
    debug!(max_tokens = %request.max_tokens, temperature = %request.temperature, "complete_json: called");
    let response = llm.complete(request.structured()).await?;

    let content = response.content.unwrap_or_default();
    let preview: String = content.chars().take(200).collect();
    debug!(%preview, "complete_json: response received");

    parse_json_response(&content)
}

//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless LLM client - each call is independent (fresh context)
///
/// Roamer never keeps provider-side conversation state: every agent call
/// sends the full context it needs, and conversation memory lives in
/// [`crate::conversation::ConversationState`].
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request and wait for the full response
    ///
    /// No retries and no backoff: a failure is returned to the caller as-is.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

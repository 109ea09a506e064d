//! Conversation error types

use std::fmt;

use thiserror::Error;

use crate::llm::{JsonCallError, LlmError};

/// Coarse classification of a turn failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Generative backend unreachable, errored, or returned empty content
    Service,
    /// Backend returned non-JSON or schema-violating content
    MalformedOutput,
    /// Extraction succeeded but no destination was stated
    MissingLocation,
    /// Anything else that broke the turn
    Pipeline,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Service => "ServiceError",
            ErrorKind::MalformedOutput => "MalformedOutputError",
            ErrorKind::MissingLocation => "MissingLocationError",
            ErrorKind::Pipeline => "PipelineError",
        };
        f.write_str(name)
    }
}

/// Errors raised inside a conversation turn
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("Service error: {0}")]
    Service(#[source] LlmError),

    #[error("Malformed model output: {0}")]
    MalformedOutput(String),

    #[error("Location is required")]
    MissingLocation,

    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

impl ConversationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConversationError::Service(_) => ErrorKind::Service,
            ConversationError::MalformedOutput(_) => ErrorKind::MalformedOutput,
            ConversationError::MissingLocation => ErrorKind::MissingLocation,
            ConversationError::Pipeline(_) => ErrorKind::Pipeline,
        }
    }

    /// Conversational text shown to the traveler instead of an error code
    pub fn user_message(&self) -> String {
        match self {
            ConversationError::Service(e) if e.is_retryable() => {
                "I'm having trouble reaching the planning service right now. Please try again in a moment.".to_string()
            }
            ConversationError::Service(_) => {
                "Sorry, the planning service couldn't handle that request. Could you try rephrasing it?".to_string()
            }
            ConversationError::MalformedOutput(_) => "I had trouble understanding your request. \
                 Could you please tell me where you want to go, for how long, and what interests you?"
                .to_string(),
            ConversationError::MissingLocation => {
                "I couldn't tell where you'd like to go. Which destination do you have in mind?".to_string()
            }
            ConversationError::Pipeline(msg) => format!("Sorry, something went wrong with your request: {}", msg),
        }
    }
}

impl From<JsonCallError> for ConversationError {
    fn from(err: JsonCallError) -> Self {
        match err {
            JsonCallError::Service(e) => ConversationError::Service(e),
            JsonCallError::Malformed(msg) => ConversationError::MalformedOutput(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(ConversationError::MissingLocation.kind(), ErrorKind::MissingLocation);
        assert_eq!(ConversationError::Pipeline("x".into()).kind(), ErrorKind::Pipeline);
        assert_eq!(
            ConversationError::from(JsonCallError::Malformed("eof".into())).kind(),
            ErrorKind::MalformedOutput
        );
        assert_eq!(
            ConversationError::from(JsonCallError::Service(LlmError::EmptyResponse)).kind(),
            ErrorKind::Service
        );
    }

    #[test]
    fn test_user_messages_are_conversational() {
        let errors = [
            ConversationError::Service(LlmError::EmptyResponse),
            ConversationError::MalformedOutput("bad".into()),
            ConversationError::MissingLocation,
            ConversationError::Pipeline("template".into()),
        ];
        for err in errors {
            let msg = err.user_message();
            assert!(!msg.contains("Error"), "raw error code leaked: {}", msg);
            assert!(msg.ends_with('?') || msg.ends_with('.') || msg.contains(':'));
        }
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ErrorKind::MissingLocation.to_string(), "MissingLocationError");
        assert_eq!(ErrorKind::Service.to_string(), "ServiceError");
    }
}

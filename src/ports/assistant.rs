//! Assistant Port - one reply from the first-line assistant.
//!
//! Implementations combine a prompt, static context and a text provider.
//! The orchestrator and the stateless chat endpoints depend on this port only.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::conversation::HistoryTurn;
use crate::domain::foundation::SessionId;
use crate::domain::support::EscalationType;
use crate::ports::AIError;

/// What the assistant is asked.
#[derive(Debug, Clone)]
pub struct AssistantRequest {
    pub message: String,
    /// Prior turns, oldest first.
    pub history: Vec<HistoryTurn>,
    pub session_id: Option<SessionId>,
}

impl AssistantRequest {
    pub fn new(message: impl Into<String>, history: Vec<HistoryTurn>) -> Self {
        Self {
            message: message.into(),
            history,
            session_id: None,
        }
    }

    pub fn for_session(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }
}

/// The assistant's answer plus its escalation verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssistantReply {
    pub text: String,
    pub should_escalate: bool,
    pub escalation_type: Option<EscalationType>,
}

impl AssistantReply {
    /// A reply that never escalates.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            should_escalate: false,
            escalation_type: None,
        }
    }

    pub fn escalating(text: impl Into<String>, escalation_type: EscalationType) -> Self {
        Self {
            text: text.into(),
            should_escalate: true,
            escalation_type: Some(escalation_type),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("message is required")]
    EmptyMessage,

    #[error("text provider failed: {0}")]
    Provider(#[from] AIError),
}

#[async_trait]
pub trait Assistant: Send + Sync {
    /// Produce one reply. Never retries.
    async fn reply(&self, request: AssistantRequest) -> Result<AssistantReply, AssistantError>;

    /// Canned text shown when [`Assistant::reply`] fails.
    fn fallback_text(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escalating_reply_carries_type() {
        let reply = AssistantReply::escalating("Transferring you", EscalationType::General);
        assert!(reply.should_escalate);
        assert_eq!(reply.escalation_type, Some(EscalationType::General));
        assert!(!AssistantReply::plain("hi").should_escalate);
    }

    #[test]
    fn provider_error_converts() {
        let err: AssistantError = AIError::EmptyResponse.into();
        assert_eq!(err.to_string(), "text provider failed: empty response from provider");
    }
}

//! ChatReplyHandler - first-line appointment support replies.
//!
//! Classifies the customer's message for escalation, asks the provider with
//! the appointment instructions and returns both.

use async_trait::async_trait;
use std::sync::Arc;

use super::completion::completion_request;
use crate::domain::catalog::AppointmentContext;
use crate::domain::support::{appointment_instructions, KeywordClassifier};
use crate::ports::{
    AIProvider, Assistant, AssistantError, AssistantReply, AssistantRequest, GenerationSettings,
};

pub const CHAT_FALLBACK: &str = "I'm having trouble processing your request right now. Please try asking about your appointment or let me know how I can help.";

/// Handler for appointment chat replies.
pub struct ChatReplyHandler {
    provider: Arc<dyn AIProvider>,
    classifier: Arc<KeywordClassifier>,
    instructions: String,
}

impl ChatReplyHandler {
    pub fn new(
        provider: Arc<dyn AIProvider>,
        classifier: Arc<KeywordClassifier>,
        context: &AppointmentContext,
    ) -> Self {
        Self {
            provider,
            classifier,
            instructions: appointment_instructions(context),
        }
    }
}

#[async_trait]
impl Assistant for ChatReplyHandler {
    async fn reply(&self, request: AssistantRequest) -> Result<AssistantReply, AssistantError> {
        if request.message.trim().is_empty() {
            return Err(AssistantError::EmptyMessage);
        }

        // The verdict comes from the customer's words, not the model's.
        let escalation = self.classifier.classify_escalation(&request.message);

        let completion = completion_request(
            &self.instructions,
            &request,
            GenerationSettings::conversational(),
        );
        let response = self.provider.complete(completion).await?;

        tracing::debug!(
            model = %response.model,
            tokens = response.usage.total_tokens,
            escalation = ?escalation,
            "Chat reply generated"
        );

        Ok(match escalation {
            Some(kind) => AssistantReply::escalating(response.content, kind),
            None => AssistantReply::plain(response.content),
        })
    }

    fn fallback_text(&self) -> &str {
        CHAT_FALLBACK
    }
}

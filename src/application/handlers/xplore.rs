//! XploreReplyHandler - healthcare concierge replies over the catalog.

use async_trait::async_trait;
use std::sync::Arc;

use super::completion::completion_request;
use crate::domain::catalog::HealthcareContext;
use crate::domain::support::xplore_instructions;
use crate::ports::{
    AIProvider, Assistant, AssistantError, AssistantReply, AssistantRequest, GenerationSettings,
};

pub const XPLORE_FALLBACK: &str = "I'm having trouble processing your request right now. Please try asking about healthcare providers, packages, or slots again.";

/// Handler for Xplore concierge replies. Never escalates on its own.
pub struct XploreReplyHandler {
    provider: Arc<dyn AIProvider>,
    instructions: String,
}

impl XploreReplyHandler {
    /// # Errors
    /// Returns an error if the catalog cannot be rendered as JSON
    pub fn new(
        provider: Arc<dyn AIProvider>,
        catalog: &HealthcareContext,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            provider,
            instructions: xplore_instructions(catalog)?,
        })
    }
}

#[async_trait]
impl Assistant for XploreReplyHandler {
    async fn reply(&self, request: AssistantRequest) -> Result<AssistantReply, AssistantError> {
        if request.message.trim().is_empty() {
            return Err(AssistantError::EmptyMessage);
        }

        let completion =
            completion_request(&self.instructions, &request, GenerationSettings::descriptive());
        let response = self.provider.complete(completion).await?;

        tracing::debug!(
            model = %response.model,
            tokens = response.usage.total_tokens,
            "Xplore reply generated"
        );

        Ok(AssistantReply::plain(response.content))
    }

    fn fallback_text(&self) -> &str {
        XPLORE_FALLBACK
    }
}

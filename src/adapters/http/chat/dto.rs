//! Request and response bodies of the stateless chat endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::conversation::HistoryTurn;
use crate::domain::support::EscalationType;

/// Tag on every successful reply.
pub const REPLY_SOURCE: &str = "gemini";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub conversation_history: Vec<HistoryTurn>,
}

/// POST /api/chat response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    pub should_escalate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalation_type: Option<EscalationType>,
    pub source: &'static str,
}

/// POST /api/xplore response.
#[derive(Debug, Clone, Serialize)]
pub struct XploreResponse {
    pub response: String,
    pub source: &'static str,
}

/// Error body of the chat endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub should_escalate: bool,
}

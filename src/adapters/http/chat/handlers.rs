//! HTTP handlers for the stateless chat endpoints.
//!
//! Text-service failures never reach the client as errors: the assistant's
//! fallback text is returned with a 200.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::ports::{Assistant, AssistantError, AssistantReply, AssistantRequest};

use super::super::AppState;
use super::dto::{ChatErrorBody, ChatRequest, ChatResponse, XploreResponse, REPLY_SOURCE};

/// Chat endpoint error that implements IntoResponse.
#[derive(Debug)]
pub enum ChatApiError {
    MessageRequired,
    InvalidBody(String),
}

impl IntoResponse for ChatApiError {
    fn into_response(self) -> Response {
        let (error, details) = match self {
            ChatApiError::MessageRequired => ("Message is required", None),
            ChatApiError::InvalidBody(details) => ("Invalid request body", Some(details)),
        };
        let body = ChatErrorBody {
            error: error.to_string(),
            details,
            should_escalate: false,
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ChatApiError {
    fn from(rejection: JsonRejection) -> Self {
        ChatApiError::InvalidBody(rejection.body_text())
    }
}

async fn answer(
    assistant: &dyn Assistant,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<AssistantReply, ChatApiError> {
    let Json(request) = payload?;
    let message = request
        .message
        .filter(|m| !m.is_empty())
        .ok_or(ChatApiError::MessageRequired)?;

    tracing::debug!(
        history = request.conversation_history.len(),
        "Chat message received"
    );

    match assistant
        .reply(AssistantRequest::new(message, request.conversation_history))
        .await
    {
        Ok(reply) => Ok(reply),
        Err(AssistantError::EmptyMessage) => Err(ChatApiError::MessageRequired),
        Err(AssistantError::Provider(err)) => {
            tracing::warn!(error = %err, "Assistant failed, sending fallback");
            Ok(AssistantReply::plain(assistant.fallback_text()))
        }
    }
}

/// POST /api/chat
///
/// Appointment assistant reply plus its escalation verdict.
pub async fn post_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ChatApiError> {
    let reply = answer(state.chat.as_ref(), payload).await?;

    Ok(Json(ChatResponse {
        response: reply.text,
        should_escalate: reply.should_escalate,
        escalation_type: reply.escalation_type,
        source: REPLY_SOURCE,
    }))
}

/// POST /api/xplore
///
/// Concierge reply over the healthcare dataset.
pub async fn post_xplore(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<XploreResponse>, ChatApiError> {
    let reply = answer(state.xplore.as_ref(), payload).await?;

    Ok(Json(XploreResponse {
        response: reply.text,
        source: REPLY_SOURCE,
    }))
}

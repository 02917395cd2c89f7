//! Shared request assembly for the assistant handlers.

use uuid::Uuid;

use crate::domain::conversation::{HistoryTurn, TurnRole};
use crate::domain::support::{compose_user_turn, PROMPT_HISTORY_TURNS};
use crate::ports::{
    AssistantRequest, CompletionRequest, GenerationSettings, Message, MessageRole, RequestMetadata,
};

/// History (last few turns) followed by instructions plus the quoted query.
pub(crate) fn completion_request(
    instructions: &str,
    request: &AssistantRequest,
    generation: GenerationSettings,
) -> CompletionRequest {
    let mut metadata = RequestMetadata::new(Uuid::new_v4().to_string());
    if let Some(session_id) = request.session_id {
        metadata = metadata.with_session(session_id);
    }

    let skip = request.history.len().saturating_sub(PROMPT_HISTORY_TURNS);
    let history = request.history.iter().skip(skip).map(to_provider_message);

    CompletionRequest::new(metadata)
        .with_messages(history)
        .with_message(
            MessageRole::User,
            compose_user_turn(instructions, &request.message),
        )
        .with_generation(generation)
}

fn to_provider_message(turn: &HistoryTurn) -> Message {
    match turn.role {
        TurnRole::User => Message::user(turn.text.clone()),
        TurnRole::Model => Message::assistant(turn.text.clone()),
    }
}

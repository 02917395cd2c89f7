//! Append-only conversation transcript and the model context window derived from it.

use serde::{Deserialize, Serialize};

use super::message::{Message, Sender};

/// Role of a turn as the text-completion service sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

/// One prior exchange line handed to the text-completion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: TurnRole,
    pub text: String,
}

impl HistoryTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
        }
    }
}

/// Ordered message log for one session.
///
/// Insertion order is turn order; messages are never edited or removed.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ConversationHistory {
    messages: Vec<Message>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message and returns a reference to it.
    pub fn push(&mut self, message: Message) -> &Message {
        self.messages.push(message);
        // just pushed
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The last `limit` non-system messages as model context, oldest first.
    pub fn window(&self, limit: usize) -> Vec<HistoryTurn> {
        let conversational: Vec<&Message> = self
            .messages
            .iter()
            .filter(|m| m.sender().is_conversational())
            .collect();
        let skip = conversational.len().saturating_sub(limit);

        conversational
            .into_iter()
            .skip(skip)
            .map(|m| match m.sender() {
                Sender::User => HistoryTurn::user(m.text()),
                _ => HistoryTurn::model(m.text()),
            })
            .collect()
    }
}

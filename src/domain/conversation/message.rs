//! Message entity for support conversations.
//!
//! Messages are immutable records appended to a session transcript. Each
//! message has a sender, text, optional display hints, and a timestamp.

use crate::domain::foundation::{DomainError, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a message within a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Creates a new random MessageId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    /// Status notices (joins, transfers). Never fed back to the model.
    System,
    /// The customer.
    User,
    /// The first-line assistant.
    Agent,
    /// The human escalation target.
    SeniorAgent,
}

impl Sender {
    /// Returns true for senders whose text belongs in the model context.
    pub fn is_conversational(&self) -> bool {
        !matches!(self, Self::System)
    }
}

/// Rendering hint attached to a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayTag {
    /// The text contains a markdown table.
    Tabular,
}

impl DisplayTag {
    /// Detects a markdown table in reply text.
    pub fn detect(text: &str) -> Option<Self> {
        (text.contains('|') && text.contains("-|-")).then_some(Self::Tabular)
    }
}

/// An immutable message within a conversation.
///
/// # Invariants
///
/// - `id` is globally unique
/// - `text` is non-blank (validated at construction)
/// - `created_at` is set at construction and never changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    sender: Sender,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<DisplayTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    initials: Option<String>,
    created_at: Timestamp,
}

impl Message {
    /// Creates a new message from the given sender.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if text is blank
    pub fn new(sender: Sender, text: impl Into<String>) -> Result<Self, DomainError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DomainError::validation("text", "Message text cannot be empty"));
        }

        Ok(Self {
            id: MessageId::new(),
            sender,
            text,
            tag: None,
            initials: None,
            created_at: Timestamp::now(),
        })
    }

    /// Creates a user message.
    pub fn user(text: impl Into<String>) -> Result<Self, DomainError> {
        Self::new(Sender::User, text)
    }

    /// Creates a system notice.
    pub fn system(text: impl Into<String>) -> Result<Self, DomainError> {
        Self::new(Sender::System, text)
    }

    /// Attaches a display tag.
    pub fn with_tag(mut self, tag: Option<DisplayTag>) -> Self {
        self.tag = tag;
        self
    }

    /// Attaches the avatar initials shown next to agent messages.
    pub fn with_initials(mut self, initials: impl Into<String>) -> Self {
        self.initials = Some(initials.into());
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tag(&self) -> Option<DisplayTag> {
        self.tag
    }

    pub fn initials(&self) -> Option<&str> {
        self.initials.as_deref()
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Returns true if this message is from the customer.
    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}

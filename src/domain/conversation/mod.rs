//! Conversation domain module.
//!
//! The append-only message log of a support session and the model context
//! window derived from it.

mod history;
mod message;

pub use history::{ConversationHistory, HistoryTurn, TurnRole};
pub use message::{DisplayTag, Message, MessageId, Sender};

//! Application handlers.
//!
//! The two assistant handlers (appointment chat, Xplore concierge) and the
//! orchestrator that runs support sessions on top of them.

mod completion;

pub mod chat;
pub mod support;
pub mod xplore;

pub use chat::{ChatReplyHandler, CHAT_FALLBACK};
pub use support::{FlowRuntime, SupportError, SupportOrchestrator, TurnOutcome, RATING_ACK_DELAY};
pub use xplore::{XploreReplyHandler, XPLORE_FALLBACK};

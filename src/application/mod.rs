//! Application layer - Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::{
    ChatReplyHandler, FlowRuntime, SupportError, SupportOrchestrator, TurnOutcome,
    XploreReplyHandler,
};

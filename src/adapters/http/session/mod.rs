//! Session HTTP adapter.
//!
//! Exposes the support orchestrator: the server owns the transcript and the
//! escalation state.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::{MessageView, SessionView, TurnView};
pub use routes::session_routes;

//! Stateless chat HTTP adapter.
//!
//! The caller owns the transcript and sends recent turns with each message.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::{ChatRequest, ChatResponse, XploreResponse};
pub use routes::chat_routes;

//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Gemini text service and a scripted mock
//! - `http` - axum routes for the chat, session and catalog APIs
//! - `pacing` - tokio-timer and recording pacers
//! - `storage` - in-memory session store

pub mod ai;
pub mod http;
pub mod pacing;
pub mod storage;

pub use ai::{GeminiConfig, GeminiProvider, MockAIProvider};
pub use http::{api_router, api_routes, AppState};
pub use pacing::{RecordingPacer, TokioPacer};
pub use storage::InMemorySessionStore;

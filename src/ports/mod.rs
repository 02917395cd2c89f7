//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - hosted text-generation model
//! - `Assistant` - one first-line assistant reply (prompt + provider)
//! - `SessionStore` - live support sessions
//! - `Pacer` - simulated delays between chat steps

mod ai_provider;
mod assistant;
mod pacer;
mod session_store;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, GenerationSettings,
    Message, MessageRole, ProviderInfo, RequestMetadata, TokenUsage,
};
pub use assistant::{Assistant, AssistantError, AssistantReply, AssistantRequest};
pub use pacer::Pacer;
pub use session_store::{SessionHandle, SessionStore, SessionStoreError};

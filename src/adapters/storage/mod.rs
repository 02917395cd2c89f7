//! Storage Adapters
//!
//! Implementations of the SessionStore port.
//!
//! - **InMemorySessionStore** - process-local map of live sessions

mod in_memory_session_store;

pub use in_memory_session_store::InMemorySessionStore;

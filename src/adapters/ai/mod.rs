//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port.
//!
//! ## Available Adapters
//!
//! - `GeminiProvider` - Google Gemini via the Generative Language REST API
//! - `MockAIProvider` - Scripted replies for tests

mod gemini_provider;
mod mock_provider;

pub use gemini_provider::{GeminiConfig, GeminiProvider};
pub use mock_provider::{MockAIProvider, DEFAULT_REPLY};

//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types
//! that form the vocabulary of the support desk domain.

mod errors;
mod ids;
mod rating;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::SessionId;
pub use rating::CsatRating;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;

//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, ratings, errors, state machines)
//! - `conversation` - Messages and the transcript of a chat
//! - `support` - Classifiers, escalation phases and the support session aggregate
//! - `catalog` - Static appointment and healthcare reference data

pub mod catalog;
pub mod conversation;
pub mod foundation;
pub mod support;

//! Support session orchestration.
//!
//! Drives customer turns, scripted hand-offs and the rating flow over the
//! session store, pacing each step like a human agent would.

mod orchestrator;

pub use orchestrator::{
    FlowRuntime, SupportError, SupportOrchestrator, TurnOutcome, RATING_ACK_DELAY,
};

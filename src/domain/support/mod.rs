//! Support desk domain.
//!
//! Keyword classifiers, the escalation phase machine, the session aggregate
//! the booking it is about, and the scripted copy that surrounds a hand-off
//! to a senior agent.

mod booking;
mod classifier;
mod flow;
mod phase;
mod prompts;
mod script;
mod session;
mod typing;

pub use booking::{
    reschedule_dates, AppointmentStatus, Booking, CancellationReason, DEFAULT_BOOKING_TIME,
    RESCHEDULE_TIMES, RESCHEDULE_WINDOW_DAYS,
};
pub use classifier::{EscalationType, KeywordClassifier, PhraseLists};
pub use flow::{FlowProfile, SupportFlow};
pub use phase::SupportPhase;
pub use prompts::{
    appointment_instructions, compose_user_turn, xplore_instructions, GENERAL_ESCALATION_REPLY,
    PROMPT_HISTORY_TURNS, TECHNICIAN_CONTACT_REPLY,
};
pub use script::{
    rating_acknowledgement, Script, ScriptStep, SeniorAgentProfile, StepEffect, TransferTimings,
    ASSISTANT_INITIALS, ESCALATION_ACCEPTED, ESCALATION_DECLINED, TRANSFER_NOTICE,
};
pub use session::{SupportSession, TurnRoute, UserTurn};
pub use typing::{TypingDelay, TypingModel};

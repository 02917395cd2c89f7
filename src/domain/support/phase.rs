//! SupportPhase - who is handling a support conversation right now.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Phase of a support session.
///
/// `Bot`, `Transferring` and `SeniorAgent` are the conversational phases.
/// `RatingPrompt` and `EscalationPrompt` are modal and suspend free-text input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SupportPhase {
    #[default]
    Bot,
    Transferring,
    SeniorAgent,
    RatingPrompt,
    EscalationPrompt,
    Closed,
}

impl SupportPhase {
    /// Returns true if a customer message can be submitted in this phase.
    pub fn accepts_user_input(&self) -> bool {
        matches!(self, SupportPhase::Bot | SupportPhase::SeniorAgent)
    }

    /// Returns true for the rating and escalation dialogs.
    pub fn is_modal(&self) -> bool {
        matches!(self, SupportPhase::RatingPrompt | SupportPhase::EscalationPrompt)
    }
}

impl StateMachine for SupportPhase {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SupportPhase::*;
        matches!(
            (self, target),
            (Bot, Transferring)
                | (Bot, RatingPrompt)
                | (Transferring, SeniorAgent)
                | (RatingPrompt, Closed)
                | (RatingPrompt, EscalationPrompt)
                | (EscalationPrompt, Transferring)
                | (EscalationPrompt, Closed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SupportPhase::*;
        match self {
            Bot => vec![Transferring, RatingPrompt],
            Transferring => vec![SeniorAgent],
            RatingPrompt => vec![Closed, EscalationPrompt],
            EscalationPrompt => vec![Transferring, Closed],
            SeniorAgent | Closed => vec![],
        }
    }
}

impl fmt::Display for SupportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SupportPhase::Bot => "bot",
            SupportPhase::Transferring => "transferring",
            SupportPhase::SeniorAgent => "senior_agent",
            SupportPhase::RatingPrompt => "rating_prompt",
            SupportPhase::EscalationPrompt => "escalation_prompt",
            SupportPhase::Closed => "closed",
        };
        f.write_str(s)
    }
}

//! Per-flow behaviour: appointment support vs the Xplore concierge.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::script::{
    appointment_opening, explore_opening, Script, SeniorAgentProfile, TransferTimings,
    ASSISTANT_INITIALS,
};
use super::typing::TypingDelay;
use crate::domain::foundation::ValidationError;

/// Which chat a session belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SupportFlow {
    #[default]
    Appointment,
    Explore,
}

impl fmt::Display for SupportFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupportFlow::Appointment => f.write_str("appointment"),
            SupportFlow::Explore => f.write_str("explore"),
        }
    }
}

impl FromStr for SupportFlow {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "appointment" => Ok(SupportFlow::Appointment),
            "explore" | "xplore" => Ok(SupportFlow::Explore),
            other => Err(ValidationError::invalid_format(
                "flow",
                format!("unknown flow '{}'", other),
            )),
        }
    }
}

/// Everything the orchestrator needs to run one flow.
#[derive(Debug, Clone)]
pub struct FlowProfile {
    pub flow: SupportFlow,
    pub typing: TypingDelay,
    /// Non-system messages handed to the assistant as context.
    pub history_window: usize,
    /// Initials on assistant replies, if the flow shows an avatar.
    pub assistant_initials: Option<String>,
    /// Tag replies that contain a markdown table.
    pub tag_tables: bool,
    /// Auto-escalate after this many user turns.
    pub auto_escalate_after: Option<u32>,
    pub fallback_text: String,
    pub fallback_delay: Duration,
    pub closure_accept_delay: Duration,
    pub senior_agent: SeniorAgentProfile,
    pub transfer: TransferTimings,
    pub opening: Script,
}

impl FlowProfile {
    pub fn appointment() -> Self {
        Self {
            flow: SupportFlow::Appointment,
            typing: TypingDelay::conversational(),
            history_window: 10,
            assistant_initials: Some(ASSISTANT_INITIALS.to_string()),
            tag_tables: false,
            auto_escalate_after: None,
            fallback_text: "Sorry, I'm having a technical issue. I'm here to help with your Thyrocare Labs appointment though.".to_string(),
            fallback_delay: Duration::from_millis(1200),
            closure_accept_delay: Duration::from_millis(1000),
            senior_agent: SeniorAgentProfile::mk(),
            transfer: TransferTimings::keyword(),
            opening: appointment_opening(Duration::from_millis(1500)),
        }
    }

    pub fn explore() -> Self {
        Self {
            flow: SupportFlow::Explore,
            typing: TypingDelay::concierge(),
            history_window: 10,
            assistant_initials: None,
            tag_tables: true,
            auto_escalate_after: Some(5),
            fallback_text: "I'm having trouble processing your request right now. Please try asking about healthcare providers, packages, or slots again.".to_string(),
            fallback_delay: Duration::from_millis(1000),
            closure_accept_delay: Duration::from_millis(1000),
            senior_agent: SeniorAgentProfile::rahul(),
            transfer: TransferTimings::auto(),
            opening: explore_opening(),
        }
    }

    pub fn for_flow(flow: SupportFlow) -> Self {
        match flow {
            SupportFlow::Appointment => Self::appointment(),
            SupportFlow::Explore => Self::explore(),
        }
    }

    /// Hand-off script for this flow when escalation is triggered by a
    /// keyword or the assistant.
    pub fn escalation_script(&self) -> Script {
        self.senior_agent.keyword_transfer(self.transfer)
    }

    /// Hand-off script after too many unresolved turns.
    pub fn auto_escalation_script(&self) -> Script {
        self.senior_agent.auto_escalation(self.transfer)
    }

    /// Upper bound on the pauses in one customer turn, model latency
    /// excluded: the slowest reply followed by the slower hand-off.
    pub fn longest_turn(&self) -> Duration {
        let reply = Duration::from_millis(self.typing.max_ms)
            .max(self.fallback_delay)
            .max(self.closure_accept_delay);
        let hand_off = self
            .escalation_script()
            .total_delay()
            .max(self.auto_escalation_script().total_delay());
        reply + hand_off
    }
}

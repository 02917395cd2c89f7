//! Scripted message sequences: openings, transfers and senior agent copy.
//!
//! A script is an ordered list of steps. Each step waits for its delay, then
//! appends one message and applies its phase effect.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::conversation::Sender;

/// Agent initials for the first-line assistant.
pub const ASSISTANT_INITIALS: &str = "HS";

pub const TRANSFER_NOTICE: &str = "Transferring to Senior Agent...";

pub const ESCALATION_ACCEPTED: &str =
    "I understand. Let me escalate this to a senior agent right away.";

pub const ESCALATION_DECLINED: &str =
    "Thank you for your feedback. We'll work on improving our service. Have a great day!";

pub fn rating_acknowledgement(stars: u8) -> String {
    format!(
        "Thank you for your {}-star rating! We appreciate your feedback.",
        stars
    )
}

const SENIOR_RESPONSES: [&str; 4] = [
    "I understand your concern. Let me personally look into this for you. Can you give me more details about the specific issue?",
    "Thanks for explaining that. I'm checking your account details now. This should be resolved quickly.",
    "I see the issue here. Let me fix this for you right away. You shouldn't have to deal with this.",
    "Got it. I'm escalating this internally to get you a quick resolution. Bear with me for just a moment.",
];

/// What a step does to the session phase besides appending its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEffect {
    None,
    /// Bot/EscalationPrompt -> Transferring, sets the escalation flag.
    BeginTransfer,
    /// Transferring -> SeniorAgent.
    CompleteTransfer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptStep {
    pub delay: Duration,
    pub sender: Sender,
    pub text: String,
    pub initials: Option<String>,
    pub effect: StepEffect,
}

impl ScriptStep {
    fn new(delay: Duration, sender: Sender, text: impl Into<String>) -> Self {
        Self {
            delay,
            sender,
            text: text.into(),
            initials: None,
            effect: StepEffect::None,
        }
    }

    fn initials(mut self, initials: impl Into<String>) -> Self {
        self.initials = Some(initials.into());
        self
    }

    fn effect(mut self, effect: StepEffect) -> Self {
        self.effect = effect;
        self
    }
}

/// Ordered sequence of delayed steps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    steps: Vec<ScriptStep>,
}

impl Script {
    pub fn steps(&self) -> &[ScriptStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Sum of all step delays.
    pub fn total_delay(&self) -> Duration {
        self.steps.iter().map(|s| s.delay).sum()
    }
}

/// Delays between the stages of a hand-off, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferTimings {
    /// Pause before the hand-off starts.
    pub lead_in_ms: u64,
    /// Pause between the transfer notice and the join notice.
    pub join_ms: u64,
    /// Pause between the join notice and the greeting.
    pub greeting_ms: u64,
}

impl TransferTimings {
    /// Keyword-triggered hand-off to MK.
    pub fn keyword() -> Self {
        Self {
            lead_in_ms: 1000,
            join_ms: 3500,
            greeting_ms: 2000,
        }
    }

    /// Turn-count hand-off to Rahul.
    pub fn auto() -> Self {
        Self {
            lead_in_ms: 1000,
            join_ms: 1500,
            greeting_ms: 2000,
        }
    }
}

impl Default for TransferTimings {
    fn default() -> Self {
        Self::keyword()
    }
}

/// The human the conversation is handed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeniorAgentProfile {
    pub name: String,
    pub initials: String,
    pub greeting: String,
    pub responses: Vec<String>,
}

impl SeniorAgentProfile {
    pub fn mk() -> Self {
        Self {
            name: "MK".to_string(),
            initials: "MK".to_string(),
            greeting: "Hi, I'm MK, your senior support agent. Don't worry, I'm checking the details and will assist you right away. Please give me a moment.".to_string(),
            responses: SENIOR_RESPONSES.iter().map(|r| r.to_string()).collect(),
        }
    }

    pub fn rahul() -> Self {
        Self {
            name: "Rahul".to_string(),
            initials: "R".to_string(),
            greeting: "Hello, I'm Rahul, a senior support agent. I understand you're having an issue that our assistant couldn't resolve. Could you please summarize your concern so I can help you better?".to_string(),
            responses: SENIOR_RESPONSES.iter().map(|r| r.to_string()).collect(),
        }
    }

    /// Uniform pick from the canned responses.
    pub fn pick_response<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        if self.responses.is_empty() {
            return &self.greeting;
        }
        let index = rng.gen_range(0..self.responses.len());
        &self.responses[index]
    }

    /// Transfer notice, then join notice, then greeting.
    pub fn keyword_transfer(&self, timings: TransferTimings) -> Script {
        Script {
            steps: vec![
                ScriptStep::new(
                    Duration::from_millis(timings.lead_in_ms),
                    Sender::System,
                    TRANSFER_NOTICE,
                )
                .effect(StepEffect::BeginTransfer),
                ScriptStep::new(
                    Duration::from_millis(timings.join_ms),
                    Sender::System,
                    format!("{} (Senior Agent) has joined the chat.", self.name),
                )
                .effect(StepEffect::CompleteTransfer),
                ScriptStep::new(
                    Duration::from_millis(timings.greeting_ms),
                    Sender::SeniorAgent,
                    self.greeting.clone(),
                )
                .initials(self.initials.clone()),
            ],
        }
    }

    /// System apology, then "joining" notice, then greeting.
    pub fn auto_escalation(&self, timings: TransferTimings) -> Script {
        Script {
            steps: vec![
                ScriptStep::new(
                    Duration::from_millis(timings.lead_in_ms),
                    Sender::System,
                    "Sorry to see we were unable to resolve your query, please wait we are escalating your issue to a senior agent.",
                )
                .effect(StepEffect::BeginTransfer),
                ScriptStep::new(
                    Duration::from_millis(timings.join_ms),
                    Sender::System,
                    "Senior Agent is joining...",
                ),
                ScriptStep::new(
                    Duration::from_millis(timings.greeting_ms),
                    Sender::SeniorAgent,
                    self.greeting.clone(),
                )
                .initials(self.initials.clone())
                .effect(StepEffect::CompleteTransfer),
            ],
        }
    }
}

/// Join notice followed by the appointment greeting.
pub fn appointment_opening(greeting_delay: Duration) -> Script {
    Script {
        steps: vec![
            ScriptStep::new(
                Duration::ZERO,
                Sender::System,
                "Health Saathi assistant is joining. Please explain your concern so we can help you better.",
            ),
            ScriptStep::new(
                greeting_delay,
                Sender::Agent,
                "Hello! I'm here to help with your home collection appointment with Thyrocare Labs on 29 May at 5:00 PM. What can I assist you with?",
            )
            .initials(ASSISTANT_INITIALS),
        ],
    }
}

/// Concierge welcome, shown immediately.
pub fn explore_opening() -> Script {
    Script {
        steps: vec![ScriptStep::new(
            Duration::ZERO,
            Sender::Agent,
            "👋 Welcome to Xplore Labs & Packages!\n\nI'm your personal healthcare concierge. I can help you find providers, understand test packages, compare prices, and book appointments. What would you like to explore today?\n\nTip: Click on the icons above to see sample queries.",
        )],
    }
}

//! Chat pacing and classifier configuration
//!
//! Every field is optional; unset values keep the built-in flow profiles.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::support::{
    FlowProfile, KeywordClassifier, PhraseLists, TransferTimings, TypingDelay,
};

/// Chat configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub appointment: FlowOverrides,

    #[serde(default)]
    pub explore: FlowOverrides,

    /// Trigger phrases. Lists left out keep their defaults.
    #[serde(default)]
    pub phrases: PhraseLists,

    #[serde(default)]
    pub sessions: SessionLifetime,
}

/// How long an untouched session is kept
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionLifetime {
    /// Zero keeps sessions until they are deleted.
    pub idle_timeout_secs: u64,
    pub sweep_interval_secs: u64,
}

impl Default for SessionLifetime {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 30 * 60,
            sweep_interval_secs: 60,
        }
    }
}

impl SessionLifetime {
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_secs > 0).then(|| Duration::from_secs(self.idle_timeout_secs))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Per-flow overrides applied on top of a built-in profile
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlowOverrides {
    pub typing: Option<TypingDelay>,
    pub history_window: Option<usize>,
    pub transfer: Option<TransferTimings>,
    /// Zero turns this flow's auto-escalation off.
    pub auto_escalate_after: Option<u32>,
}

impl FlowOverrides {
    fn apply(&self, mut profile: FlowProfile) -> FlowProfile {
        if let Some(typing) = self.typing {
            profile.typing = typing;
        }
        if let Some(window) = self.history_window {
            profile.history_window = window;
        }
        if let Some(transfer) = self.transfer {
            profile.transfer = transfer;
        }
        if let Some(after) = self.auto_escalate_after {
            profile.auto_escalate_after = (after > 0).then_some(after);
        }
        profile
    }

    fn validate(&self, flow: &'static str) -> Result<(), ValidationError> {
        if let Some(typing) = &self.typing {
            if typing.min_ms > typing.max_ms {
                return Err(ValidationError::InvalidTypingBounds);
            }
        }
        if self.history_window == Some(0) {
            return Err(ValidationError::ChatSettingOutOfRange(flow));
        }
        Ok(())
    }
}

impl ChatConfig {
    pub fn appointment_profile(&self) -> FlowProfile {
        self.appointment.apply(FlowProfile::appointment())
    }

    pub fn explore_profile(&self) -> FlowProfile {
        self.explore.apply(FlowProfile::explore())
    }

    /// Longest scripted turn across both flows.
    pub fn longest_turn(&self) -> Duration {
        self.appointment_profile()
            .longest_turn()
            .max(self.explore_profile().longest_turn())
    }

    pub fn classifier(&self) -> KeywordClassifier {
        KeywordClassifier::new(self.phrases.clone())
    }

    /// Validate chat configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.appointment.validate("appointment.history_window")?;
        self.explore.validate("explore.history_window")?;
        if self.phrases.general_escalation.is_empty() {
            return Err(ValidationError::MissingRequired("phrases.general_escalation"));
        }
        if self.sessions.sweep_interval_secs == 0 {
            return Err(ValidationError::ChatSettingOutOfRange("sessions.sweep_interval_secs"));
        }
        Ok(())
    }
}

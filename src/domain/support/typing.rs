//! Simulated typing time for outgoing agent messages.
//!
//! The delay hides the real latency of the text service behind a pace that
//! depends only on the reply itself.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How reply length turns into typing time before clamping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum TypingModel {
    /// Space-separated words at a fixed words-per-minute rate.
    WordsPerMinute { words_per_minute: u32 },
    /// A fixed cost per character.
    PerCharacter { millis_per_char: u64 },
}

/// Clamped typing-delay calculator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TypingDelay {
    pub model: TypingModel,
    pub min_ms: u64,
    pub max_ms: u64,
}

impl TypingDelay {
    /// 60 wpm, clamped to 800..=2500 ms.
    pub fn conversational() -> Self {
        Self {
            model: TypingModel::WordsPerMinute {
                words_per_minute: 60,
            },
            min_ms: 800,
            max_ms: 2500,
        }
    }

    /// 5 ms per character, clamped to 800..=2000 ms.
    pub fn concierge() -> Self {
        Self {
            model: TypingModel::PerCharacter { millis_per_char: 5 },
            min_ms: 800,
            max_ms: 2000,
        }
    }

    pub fn for_text(&self, text: &str) -> Duration {
        let raw_ms = match self.model {
            TypingModel::WordsPerMinute { words_per_minute } => {
                // Counts empty segments between repeated spaces as words.
                let words = text.split(' ').count() as f64;
                let wpm = f64::from(words_per_minute.max(1));
                (words / wpm * 60_000.0) as u64
            }
            TypingModel::PerCharacter { millis_per_char } => {
                (text.chars().count() as u64).saturating_mul(millis_per_char)
            }
        };

        Duration::from_millis(raw_ms.max(self.min_ms).min(self.max_ms))
    }
}

impl Default for TypingDelay {
    fn default() -> Self {
        Self::conversational()
    }
}

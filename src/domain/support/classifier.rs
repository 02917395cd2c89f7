//! Keyword classifiers over free text.
//!
//! Every predicate lower-cases and trims its input, then checks whether any
//! phrase from a fixed list occurs as a substring. There is no negation
//! handling or stemming: "no" inside "not now" still counts as a decline.

use serde::{Deserialize, Serialize};

/// Why a conversation is being handed to a senior agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationType {
    /// The customer cannot reach the assigned technician.
    TechnicianContact,
    /// General dissatisfaction or an explicit request for a human.
    General,
}

impl EscalationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TechnicianContact => "technician_contact",
            Self::General => "general",
        }
    }
}

impl std::fmt::Display for EscalationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trigger phrases per category. Loaded from configuration when overridden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhraseLists {
    pub technician_contact: Vec<String>,
    pub general_escalation: Vec<String>,
    pub closure_offer: Vec<String>,
    pub acceptance: Vec<String>,
    pub decline: Vec<String>,
}

fn owned(phrases: &[&str]) -> Vec<String> {
    phrases.iter().map(|p| p.to_string()).collect()
}

impl Default for PhraseLists {
    fn default() -> Self {
        Self {
            technician_contact: owned(&[
                "this number is not reachable",
                "not picking up",
                "phone is switched off",
                "can't contact the technician",
                "technician not answering",
                "number not working",
                "call not connecting",
                "phone not reachable",
                "technician not responding",
                "can't reach technician",
            ]),
            general_escalation: owned(&[
                "want to talk to a human",
                "speak to senior",
                "not happy",
                "angry",
                "refund",
                "escalate",
                "manager",
                "supervisor",
                "human agent",
                "real person",
                "frustrated",
                "disappointed",
                "terrible service",
                "worst experience",
                "complaint",
                "unsatisfied",
            ]),
            closure_offer: owned(&[
                "would you like to share your feedback",
                "i'll go ahead and close this conversation",
                "would you like to share feedback",
                "close this conversation",
                "share your feedback",
            ]),
            acceptance: owned(&[
                "yes",
                "sure",
                "okay",
                "ok",
                "go ahead",
                "yes please",
                "that's fine",
                "thats fine",
            ]),
            decline: owned(&[
                "no thanks",
                "no thank you",
                "that's all",
                "thats all",
                "nothing else",
                "no nothing else",
                "i'm good",
                "im good",
                "all good",
                "no more",
                "that's it",
                "thats it",
                "no",
                "nope",
            ]),
        }
    }
}

/// Stateless keyword matcher over a set of phrase lists.
#[derive(Debug, Clone, Default)]
pub struct KeywordClassifier {
    lists: PhraseLists,
}

impl KeywordClassifier {
    pub fn new(lists: PhraseLists) -> Self {
        let lowered = |phrases: Vec<String>| {
            phrases
                .into_iter()
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect()
        };

        Self {
            lists: PhraseLists {
                technician_contact: lowered(lists.technician_contact),
                general_escalation: lowered(lists.general_escalation),
                closure_offer: lowered(lists.closure_offer),
                acceptance: lowered(lists.acceptance),
                decline: lowered(lists.decline),
            },
        }
    }

    pub fn phrase_lists(&self) -> &PhraseLists {
        &self.lists
    }

    pub fn is_technician_contact_issue(&self, text: &str) -> bool {
        matches_any(text, &self.lists.technician_contact)
    }

    pub fn is_general_escalation_request(&self, text: &str) -> bool {
        matches_any(text, &self.lists.general_escalation)
    }

    /// Technician contact wins over general escalation when both match.
    pub fn classify_escalation(&self, text: &str) -> Option<EscalationType> {
        if self.is_technician_contact_issue(text) {
            Some(EscalationType::TechnicianContact)
        } else if self.is_general_escalation_request(text) {
            Some(EscalationType::General)
        } else {
            None
        }
    }

    /// Applied to the assistant's outgoing text, not the customer's.
    pub fn is_closure_offer(&self, text: &str) -> bool {
        matches_any(text, &self.lists.closure_offer)
    }

    pub fn is_acceptance(&self, text: &str) -> bool {
        matches_any(text, &self.lists.acceptance)
    }

    pub fn is_decline(&self, text: &str) -> bool {
        matches_any(text, &self.lists.decline)
    }
}

fn matches_any(text: &str, phrases: &[String]) -> bool {
    let normalized = text.trim().to_lowercase();
    phrases.iter().any(|phrase| normalized.contains(phrase.as_str()))
}

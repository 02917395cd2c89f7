//! SupportSession aggregate.
//!
//! Owns the transcript and escalation state of one chat. All mutation is
//! synchronous; timing lives in the orchestrator, which calls these methods
//! between pauses.

use chrono::NaiveDate;

use crate::domain::conversation::{ConversationHistory, HistoryTurn, Message};
use crate::domain::foundation::{
    CsatRating, DomainError, ErrorCode, SessionId, StateMachine, Timestamp,
};

use super::booking::{Booking, CancellationReason};
use super::classifier::KeywordClassifier;
use super::flow::SupportFlow;
use super::phase::SupportPhase;

/// Where a customer message goes next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnRoute {
    /// Answer with a canned senior agent line.
    SeniorAgent,
    /// The customer accepted a closure offer: open the rating prompt.
    OpenRating,
    /// Ask the assistant, with the context as it stood before this message.
    Assistant { context: Vec<HistoryTurn> },
}

/// Result of accepting a customer message.
#[derive(Debug, Clone)]
pub struct UserTurn {
    pub message: Message,
    pub route: TurnRoute,
    /// Decline phrase detected. Informational only.
    pub declined: bool,
}

/// Aggregate for one support chat.
///
/// # Invariants
///
/// - `escalation_triggered` never goes back to false
/// - `csat_rating` is set at most once
/// - at most one customer turn is in flight (`awaiting_reply`)
#[derive(Debug, Clone)]
pub struct SupportSession {
    id: SessionId,
    flow: SupportFlow,
    phase: SupportPhase,
    bot_offered_closure: bool,
    escalation_triggered: bool,
    csat_rating: Option<CsatRating>,
    awaiting_reply: bool,
    user_turns: u32,
    history: ConversationHistory,
    /// Present for appointment chats only.
    booking: Option<Booking>,
    created_at: Timestamp,
}

impl SupportSession {
    pub fn new(id: SessionId, flow: SupportFlow) -> Self {
        let created_at = Timestamp::now();
        let booking = match flow {
            SupportFlow::Appointment => Some(Booking::new(created_at.date())),
            SupportFlow::Explore => None,
        };
        Self {
            id,
            flow,
            phase: SupportPhase::Bot,
            bot_offered_closure: false,
            escalation_triggered: false,
            csat_rating: None,
            awaiting_reply: false,
            user_turns: 0,
            history: ConversationHistory::new(),
            booking,
            created_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn flow(&self) -> SupportFlow {
        self.flow
    }

    pub fn phase(&self) -> SupportPhase {
        self.phase
    }

    pub fn bot_offered_closure(&self) -> bool {
        self.bot_offered_closure
    }

    pub fn escalation_triggered(&self) -> bool {
        self.escalation_triggered
    }

    pub fn csat_rating(&self) -> Option<CsatRating> {
        self.csat_rating
    }

    pub fn awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    pub fn user_turns(&self) -> u32 {
        self.user_turns
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn booking(&self) -> Option<&Booking> {
        self.booking.as_ref()
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// True when a new customer message would be accepted.
    pub fn accepts_input(&self) -> bool {
        self.phase.accepts_user_input() && !self.awaiting_reply
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Turns
    // ─────────────────────────────────────────────────────────────────────────

    /// Accepts a customer message, appends it and decides how to answer.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the text is blank
    /// - `InputNotAccepted` outside `Bot` and `SeniorAgent`
    /// - `ReplyPending` while a previous turn is still running
    pub fn begin_user_turn(
        &mut self,
        text: &str,
        classifier: &KeywordClassifier,
        window: usize,
    ) -> Result<UserTurn, DomainError> {
        let message = Message::user(text)?;

        if !self.phase.accepts_user_input() {
            return Err(DomainError::new(
                ErrorCode::InputNotAccepted,
                format!("Messages are not accepted while the chat is {}", self.phase),
            )
            .with_detail("phase", self.phase.to_string()));
        }
        if self.awaiting_reply {
            return Err(DomainError::new(
                ErrorCode::ReplyPending,
                "A reply to the previous message is still pending",
            ));
        }

        let context = self.history.window(window);
        let route = if self.phase == SupportPhase::SeniorAgent {
            TurnRoute::SeniorAgent
        } else if self.bot_offered_closure && classifier.is_acceptance(text) {
            TurnRoute::OpenRating
        } else {
            TurnRoute::Assistant { context }
        };

        self.history.push(message.clone());
        self.user_turns += 1;
        self.awaiting_reply = true;

        Ok(UserTurn {
            message,
            route,
            declined: classifier.is_decline(text),
        })
    }

    /// Releases the input lock at the end of a turn or scripted sequence.
    pub fn finish_turn(&mut self) {
        self.awaiting_reply = false;
    }

    /// Appends a message and returns a copy of it.
    pub fn append(&mut self, message: Message) -> Message {
        self.history.push(message).clone()
    }

    /// Appends an assistant reply and notes whether it offers closure.
    pub fn record_assistant_reply(
        &mut self,
        message: Message,
        classifier: &KeywordClassifier,
    ) -> Message {
        if self.phase == SupportPhase::Bot && classifier.is_closure_offer(message.text()) {
            self.bot_offered_closure = true;
        }
        self.append(message)
    }

    /// True once the turn threshold is reached in an unescalated bot chat.
    pub fn should_auto_escalate(&self, threshold: Option<u32>) -> bool {
        match threshold {
            Some(limit) => {
                self.phase == SupportPhase::Bot
                    && !self.escalation_triggered
                    && self.user_turns >= limit
            }
            None => false,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Escalation
    // ─────────────────────────────────────────────────────────────────────────

    /// Enters `Transferring`. Returns `Ok(false)` if an escalation already
    /// fired in this session.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` from any phase other than `Bot` or
    ///   `EscalationPrompt`
    pub fn begin_transfer(&mut self) -> Result<bool, DomainError> {
        if self.escalation_triggered {
            return Ok(false);
        }
        self.phase = self.phase.transition_to(SupportPhase::Transferring)?;
        self.escalation_triggered = true;
        self.bot_offered_closure = false;
        Ok(true)
    }

    pub fn complete_transfer(&mut self) -> Result<(), DomainError> {
        self.phase = self.phase.transition_to(SupportPhase::SeniorAgent)?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rating
    // ─────────────────────────────────────────────────────────────────────────

    /// Shows the rating prompt after an accepted closure offer.
    pub fn open_rating_prompt(&mut self) -> Result<(), DomainError> {
        self.phase = self.phase.transition_to(SupportPhase::RatingPrompt)?;
        self.bot_offered_closure = false;
        Ok(())
    }

    /// Records the rating. The phase moves on in [`Self::resolve_rating`].
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the rating prompt is not showing
    /// - `RatingAlreadySubmitted` on a second submission
    pub fn submit_rating(&mut self, rating: CsatRating) -> Result<(), DomainError> {
        if self.csat_rating.is_some() {
            return Err(DomainError::new(
                ErrorCode::RatingAlreadySubmitted,
                "A rating has already been submitted for this chat",
            ));
        }
        if self.phase != SupportPhase::RatingPrompt {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot rate while the chat is {}", self.phase),
            )
            .with_detail("phase", self.phase.to_string()));
        }

        self.csat_rating = Some(rating);
        self.awaiting_reply = true;
        Ok(())
    }

    /// One star opens the escalation prompt; anything else closes the chat.
    pub fn resolve_rating(&mut self) -> Result<SupportPhase, DomainError> {
        let rating = self.csat_rating.ok_or_else(|| {
            DomainError::new(ErrorCode::InvalidStateTransition, "No rating to resolve")
        })?;

        let next = if rating.is_lowest() {
            SupportPhase::EscalationPrompt
        } else {
            SupportPhase::Closed
        };
        self.phase = self.phase.transition_to(next)?;
        Ok(next)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Booking
    // ─────────────────────────────────────────────────────────────────────────

    fn booking_mut(&mut self) -> Result<&mut Booking, DomainError> {
        let flow = self.flow;
        self.booking.as_mut().ok_or_else(|| {
            DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("A {} chat has no appointment", flow),
            )
        })
    }

    /// Cancels the appointment. Works in any chat phase.
    pub fn cancel_appointment(&mut self, reason: CancellationReason) -> Result<&Booking, DomainError> {
        let booking = self.booking_mut()?;
        booking.cancel(reason)?;
        Ok(booking)
    }

    pub fn reschedule_appointment(
        &mut self,
        date: NaiveDate,
        time: &str,
        today: NaiveDate,
    ) -> Result<&Booking, DomainError> {
        let booking = self.booking_mut()?;
        booking.reschedule(date, time, today)?;
        Ok(booking)
    }

    /// Answers the post-rating escalation question.
    ///
    /// Declining closes the chat at once. Accepting locks input until the
    /// transfer script has run.
    pub fn choose_escalation(&mut self, escalate: bool) -> Result<(), DomainError> {
        if self.phase != SupportPhase::EscalationPrompt {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("No escalation question is pending while the chat is {}", self.phase),
            )
            .with_detail("phase", self.phase.to_string()));
        }
        if self.awaiting_reply {
            return Err(DomainError::new(
                ErrorCode::ReplyPending,
                "The escalation choice has already been made",
            ));
        }

        if escalate {
            self.awaiting_reply = true;
        } else {
            self.phase = self.phase.transition_to(SupportPhase::Closed)?;
        }
        Ok(())
    }
}

//! Session API bodies.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::application::TurnOutcome;
use crate::domain::conversation::{DisplayTag, Message, Sender};
use crate::domain::support::{
    reschedule_dates, AppointmentStatus, Booking, CancellationReason, SupportFlow, SupportPhase,
    SupportSession, RESCHEDULE_TIMES,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSessionRequest {
    /// `appointment` (default) or `explore`/`xplore`.
    #[serde(default)]
    pub flow: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRatingRequest {
    pub rating: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EscalationChoiceRequest {
    pub escalate: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CancelAppointmentRequest {
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RescheduleAppointmentRequest {
    /// `YYYY-MM-DD`
    pub date: NaiveDate,
    pub time: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    pub status: AppointmentStatus,
    pub date: String,
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<CancellationReason>,
}

impl From<&Booking> for BookingView {
    fn from(booking: &Booking) -> Self {
        Self {
            status: booking.status(),
            date: booking.date().to_string(),
            time: booking.time().to_string(),
            cancellation_reason: booking.cancellation_reason(),
        }
    }
}

/// Choices offered by the cancel and reschedule screens.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentOptionsView {
    pub dates: Vec<String>,
    pub times: Vec<&'static str>,
    pub cancellation_reasons: Vec<&'static str>,
}

impl AppointmentOptionsView {
    pub fn from_today(today: NaiveDate) -> Self {
        Self {
            dates: reschedule_dates(today).iter().map(ToString::to_string).collect(),
            times: RESCHEDULE_TIMES.to_vec(),
            cancellation_reasons: CancellationReason::ALL.iter().map(|r| r.label()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: String,
    pub sender: Sender,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<DisplayTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initials: Option<String>,
    pub created_at: String,
}

impl From<&Message> for MessageView {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id().as_uuid().to_string(),
            sender: message.sender(),
            text: message.text().to_string(),
            tag: message.tag(),
            initials: message.initials().map(str::to_string),
            created_at: message.created_at().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: String,
    pub flow: SupportFlow,
    pub phase: SupportPhase,
    pub accepts_input: bool,
    pub bot_offered_closure: bool,
    pub escalation_triggered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csat_rating: Option<u8>,
    pub awaiting_reply: bool,
    pub user_turns: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment: Option<BookingView>,
    pub messages: Vec<MessageView>,
    pub created_at: String,
}

impl From<&SupportSession> for SessionView {
    fn from(session: &SupportSession) -> Self {
        Self {
            id: session.id().to_string(),
            flow: session.flow(),
            phase: session.phase(),
            accepts_input: session.accepts_input(),
            bot_offered_closure: session.bot_offered_closure(),
            escalation_triggered: session.escalation_triggered(),
            csat_rating: session.csat_rating().map(|r| r.stars()),
            awaiting_reply: session.awaiting_reply(),
            user_turns: session.user_turns(),
            appointment: session.booking().map(BookingView::from),
            messages: session.history().messages().iter().map(MessageView::from).collect(),
            created_at: session.created_at().to_rfc3339(),
        }
    }
}

/// Messages appended by one operation plus the session afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct TurnView {
    pub appended: Vec<MessageView>,
    pub session: SessionView,
}

impl From<&TurnOutcome> for TurnView {
    fn from(outcome: &TurnOutcome) -> Self {
        Self {
            appended: outcome.appended.iter().map(MessageView::from).collect(),
            session: SessionView::from(&outcome.session),
        }
    }
}

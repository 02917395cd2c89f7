//! Booking - the appointment a support chat is about.
//!
//! The customer can cancel it with a reason or move it to another slot in
//! the next few days. Chat messages are not affected.

use chrono::{Duration as ChronoDuration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{DomainError, ErrorCode, StateMachine, ValidationError};

/// Days offered for a reschedule, today included.
pub const RESCHEDULE_WINDOW_DAYS: i64 = 5;

/// Slot start times offered for a reschedule.
pub const RESCHEDULE_TIMES: [&str; 9] = [
    "06:00 AM", "07:00 AM", "08:00 AM", "09:00 AM", "10:00 AM", "11:00 AM", "12:00 PM",
    "01:00 PM", "02:00 PM",
];

/// Time a fresh booking starts on.
pub const DEFAULT_BOOKING_TIME: &str = "10:00 AM";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AppointmentStatus {
    #[default]
    Initiated,
    Confirmed,
    Rescheduled,
    Cancelled,
}

impl StateMachine for AppointmentStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, target),
            (Initiated, Confirmed)
                | (Initiated, Rescheduled)
                | (Initiated, Cancelled)
                | (Confirmed, Rescheduled)
                | (Confirmed, Cancelled)
                | (Rescheduled, Rescheduled)
                | (Rescheduled, Cancelled)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use AppointmentStatus::*;
        match self {
            Initiated => vec![Confirmed, Rescheduled, Cancelled],
            Confirmed | Rescheduled => vec![Rescheduled, Cancelled],
            Cancelled => vec![],
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppointmentStatus::Initiated => "Initiated",
            AppointmentStatus::Confirmed => "Confirmed",
            AppointmentStatus::Rescheduled => "Rescheduled",
            AppointmentStatus::Cancelled => "Cancelled",
        };
        f.write_str(s)
    }
}

/// Why the customer cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CancellationReason {
    #[serde(rename = "Changed my mind")]
    ChangedMind,
    #[serde(rename = "Personal Emergency")]
    PersonalEmergency,
    #[serde(rename = "Out of town")]
    OutOfTown,
    #[serde(rename = "Wrongly booked")]
    WronglyBooked,
    #[serde(rename = "Doctor/Lab Tech not available")]
    ProviderUnavailable,
    #[serde(rename = "Others")]
    Other,
}

impl CancellationReason {
    pub const ALL: [CancellationReason; 6] = [
        CancellationReason::ChangedMind,
        CancellationReason::PersonalEmergency,
        CancellationReason::OutOfTown,
        CancellationReason::WronglyBooked,
        CancellationReason::ProviderUnavailable,
        CancellationReason::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CancellationReason::ChangedMind => "Changed my mind",
            CancellationReason::PersonalEmergency => "Personal Emergency",
            CancellationReason::OutOfTown => "Out of town",
            CancellationReason::WronglyBooked => "Wrongly booked",
            CancellationReason::ProviderUnavailable => "Doctor/Lab Tech not available",
            CancellationReason::Other => "Others",
        }
    }
}

impl fmt::Display for CancellationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CancellationReason {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|reason| reason.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                ValidationError::invalid_format(
                    "reason",
                    format!("unknown cancellation reason '{}'", wanted),
                )
            })
    }
}

/// Dates a booking made on `today` can move to.
pub fn reschedule_dates(today: NaiveDate) -> Vec<NaiveDate> {
    (0..RESCHEDULE_WINDOW_DAYS)
        .map(|offset| today + ChronoDuration::days(offset))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    status: AppointmentStatus,
    date: NaiveDate,
    time: String,
    cancellation_reason: Option<CancellationReason>,
}

impl Booking {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            status: AppointmentStatus::Initiated,
            date: today,
            time: DEFAULT_BOOKING_TIME.to_string(),
            cancellation_reason: None,
        }
    }

    pub fn status(&self) -> AppointmentStatus {
        self.status
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn cancellation_reason(&self) -> Option<CancellationReason> {
        self.cancellation_reason
    }

    /// # Errors
    ///
    /// - `InvalidStateTransition` if already cancelled
    pub fn cancel(&mut self, reason: CancellationReason) -> Result<(), DomainError> {
        self.status = self.status.transition_to(AppointmentStatus::Cancelled)?;
        self.cancellation_reason = Some(reason);
        Ok(())
    }

    /// Moves the booking to one of the offered slots.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` for a date outside the window or an unknown time
    /// - `InvalidStateTransition` if the booking is cancelled
    pub fn reschedule(
        &mut self,
        date: NaiveDate,
        time: &str,
        today: NaiveDate,
    ) -> Result<(), DomainError> {
        if !reschedule_dates(today).contains(&date) {
            return Err(DomainError::validation(
                "date",
                format!(
                    "Date must be within {} days from {}",
                    RESCHEDULE_WINDOW_DAYS, today
                ),
            ));
        }
        let slot = RESCHEDULE_TIMES
            .iter()
            .find(|slot| slot.eq_ignore_ascii_case(time.trim()))
            .ok_or_else(|| {
                DomainError::new(ErrorCode::ValidationFailed, "Time is not an offered slot")
                    .with_detail("time", time.to_string())
            })?;

        self.status = self.status.transition_to(AppointmentStatus::Rescheduled)?;
        self.date = date;
        self.time = (*slot).to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    #[test]
    fn new_booking_is_initiated_at_ten() {
        let booking = Booking::new(today());
        assert_eq!(booking.status(), AppointmentStatus::Initiated);
        assert_eq!(booking.time(), "10:00 AM");
        assert_eq!(booking.cancellation_reason(), None);
    }

    #[test]
    fn cancel_records_reason_and_is_final() {
        let mut booking = Booking::new(today());

        booking.cancel(CancellationReason::OutOfTown).unwrap();
        assert_eq!(booking.status(), AppointmentStatus::Cancelled);
        assert_eq!(booking.cancellation_reason(), Some(CancellationReason::OutOfTown));

        let err = booking.cancel(CancellationReason::Other).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidStateTransition);
        let err = booking
            .reschedule(today(), "09:00 AM", today())
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidStateTransition);
    }

    #[test]
    fn reschedule_moves_date_and_time() {
        let mut booking = Booking::new(today());
        let target = today() + ChronoDuration::days(4);

        booking.reschedule(target, "01:00 pm", today()).unwrap();

        assert_eq!(booking.status(), AppointmentStatus::Rescheduled);
        assert_eq!(booking.date(), target);
        assert_eq!(booking.time(), "01:00 PM");

        booking.reschedule(today(), "06:00 AM", today()).unwrap();
        assert_eq!(booking.time(), "06:00 AM");
    }

    #[test]
    fn reschedule_outside_window_is_rejected() {
        let mut booking = Booking::new(today());

        let err = booking
            .reschedule(today() + ChronoDuration::days(5), "09:00 AM", today())
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationFailed);

        let err = booking
            .reschedule(today() - ChronoDuration::days(1), "09:00 AM", today())
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationFailed);
        assert_eq!(booking.status(), AppointmentStatus::Initiated);
    }

    #[test]
    fn reschedule_to_unoffered_time_is_rejected() {
        let mut booking = Booking::new(today());
        let err = booking.reschedule(today(), "05:00 PM", today()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationFailed);
        assert_eq!(booking.time(), "10:00 AM");
    }

    #[test]
    fn reasons_parse_from_labels() {
        assert_eq!(
            "personal emergency".parse::<CancellationReason>().unwrap(),
            CancellationReason::PersonalEmergency
        );
        assert_eq!(
            "Doctor/Lab Tech not available".parse::<CancellationReason>().unwrap(),
            CancellationReason::ProviderUnavailable
        );
        assert!("bored".parse::<CancellationReason>().is_err());
    }

    #[test]
    fn window_covers_five_days_from_today() {
        let dates = reschedule_dates(today());
        assert_eq!(dates.len(), 5);
        assert_eq!(dates[0], today());
        assert_eq!(dates[4], NaiveDate::from_ymd_opt(2025, 6, 6).unwrap());
    }

    #[test]
    fn cancelled_is_terminal() {
        assert!(AppointmentStatus::Cancelled.is_terminal());
        assert!(!AppointmentStatus::Rescheduled.is_terminal());
    }
}

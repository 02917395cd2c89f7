//! HTTP handlers for the session API.
//!
//! Each call waits for the whole scripted sequence before responding, so a
//! message that triggers a hand-off returns after the senior agent joined.
//! A client that gives up early does not stop the sequence.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::domain::foundation::{DomainError, SessionId, Timestamp};
use crate::domain::support::{CancellationReason, SupportFlow};

use super::super::error::ApiError;
use super::super::AppState;
use super::dto::{
    AppointmentOptionsView, CancelAppointmentRequest, CreateSessionRequest,
    EscalationChoiceRequest, RescheduleAppointmentRequest, SendMessageRequest, SessionView,
    SubmitRatingRequest, TurnView,
};

fn parse_session_id(raw: &str) -> Result<SessionId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request("Invalid session ID format"))
}

/// POST /api/sessions
pub async fn create_session(
    State(state): State<AppState>,
    payload: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TurnView>), ApiError> {
    let Json(request) = payload?;
    let flow = match request.flow.as_deref() {
        Some(raw) => raw.parse::<SupportFlow>().map_err(DomainError::from)?,
        None => SupportFlow::default(),
    };

    let outcome = state.orchestrator.start_session(flow).await?;
    Ok((StatusCode::CREATED, Json(TurnView::from(&outcome))))
}

/// GET /api/sessions/:session_id
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let id = parse_session_id(&session_id)?;
    let session = state.orchestrator.get_session(id).await?;
    Ok(Json(SessionView::from(&session)))
}

/// POST /api/sessions/:session_id/messages
pub async fn send_message(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<TurnView>, ApiError> {
    let id = parse_session_id(&session_id)?;
    let Json(request) = payload?;

    let outcome = state.orchestrator.send_message(id, &request.message).await?;
    Ok(Json(TurnView::from(&outcome)))
}

/// POST /api/sessions/:session_id/rating
pub async fn submit_rating(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    payload: Result<Json<SubmitRatingRequest>, JsonRejection>,
) -> Result<Json<TurnView>, ApiError> {
    let id = parse_session_id(&session_id)?;
    let Json(request) = payload?;

    let outcome = state.orchestrator.submit_rating(id, request.rating).await?;
    Ok(Json(TurnView::from(&outcome)))
}

/// POST /api/sessions/:session_id/escalation
pub async fn choose_escalation(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    payload: Result<Json<EscalationChoiceRequest>, JsonRejection>,
) -> Result<Json<TurnView>, ApiError> {
    let id = parse_session_id(&session_id)?;
    let Json(request) = payload?;

    let outcome = state
        .orchestrator
        .choose_escalation(id, request.escalate)
        .await?;
    Ok(Json(TurnView::from(&outcome)))
}

/// DELETE /api/sessions/:session_id
pub async fn end_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_session_id(&session_id)?;
    state.orchestrator.end_session(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/sessions/:session_id/appointment/cancel
pub async fn cancel_appointment(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    payload: Result<Json<CancelAppointmentRequest>, JsonRejection>,
) -> Result<Json<SessionView>, ApiError> {
    let id = parse_session_id(&session_id)?;
    let Json(request) = payload?;
    let reason = request
        .reason
        .parse::<CancellationReason>()
        .map_err(DomainError::from)?;

    let session = state.orchestrator.cancel_appointment(id, reason).await?;
    Ok(Json(SessionView::from(&session)))
}

/// POST /api/sessions/:session_id/appointment/reschedule
pub async fn reschedule_appointment(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    payload: Result<Json<RescheduleAppointmentRequest>, JsonRejection>,
) -> Result<Json<SessionView>, ApiError> {
    let id = parse_session_id(&session_id)?;
    let Json(request) = payload?;

    let session = state
        .orchestrator
        .reschedule_appointment(id, request.date, &request.time)
        .await?;
    Ok(Json(SessionView::from(&session)))
}

/// GET /api/appointment/options
pub async fn appointment_options() -> Json<AppointmentOptionsView> {
    Json(AppointmentOptionsView::from_today(Timestamp::now().date()))
}

//! HTTP routes for the session API.

use axum::routing::{get, post};
use axum::Router;

use super::super::AppState;
use super::handlers::{
    appointment_options, cancel_appointment, choose_escalation, create_session, end_session,
    get_session, reschedule_appointment, send_message, submit_rating,
};

pub fn session_routes() -> Router<AppState> {
    Router::new()
        // POST /api/sessions
        .route("/api/sessions", post(create_session))
        // GET, DELETE /api/sessions/:session_id
        .route(
            "/api/sessions/:session_id",
            get(get_session).delete(end_session),
        )
        // POST /api/sessions/:session_id/messages
        .route("/api/sessions/:session_id/messages", post(send_message))
        // POST /api/sessions/:session_id/rating
        .route("/api/sessions/:session_id/rating", post(submit_rating))
        // POST /api/sessions/:session_id/escalation
        .route("/api/sessions/:session_id/escalation", post(choose_escalation))
        // POST /api/sessions/:session_id/appointment/cancel
        .route(
            "/api/sessions/:session_id/appointment/cancel",
            post(cancel_appointment),
        )
        // POST /api/sessions/:session_id/appointment/reschedule
        .route(
            "/api/sessions/:session_id/appointment/reschedule",
            post(reschedule_appointment),
        )
        // GET /api/appointment/options
        .route("/api/appointment/options", get(appointment_options))
}

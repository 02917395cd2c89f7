//! HTTP routes for the stateless chat endpoints.

use axum::routing::post;
use axum::Router;

use super::super::AppState;
use super::handlers::{post_chat, post_xplore};

pub fn chat_routes() -> Router<AppState> {
    Router::new()
        // POST /api/chat
        .route("/api/chat", post(post_chat))
        // POST /api/xplore
        .route("/api/xplore", post(post_xplore))
}

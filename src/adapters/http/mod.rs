//! HTTP adapters - REST API implementations.
//!
//! - `chat` - stateless `/api/chat` and `/api/xplore`
//! - `session` - server-side support sessions
//! - `catalog` - Xplore dataset lookups

pub mod catalog;
pub mod chat;
pub mod error;
pub mod session;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::adapters::storage::InMemorySessionStore;
use crate::application::{
    ChatReplyHandler, FlowRuntime, SupportOrchestrator, XploreReplyHandler,
};
use crate::config::{ChatConfig, ServerConfig};
use crate::domain::catalog::{HealthcareContext, APPOINTMENT_CONTEXT, HEALTHCARE_CONTEXT};
use crate::ports::{AIProvider, Assistant, Pacer};

pub use catalog::catalog_routes;
pub use chat::chat_routes;
pub use error::{ApiError, ErrorResponse};
pub use session::session_routes;

/// Shared state behind every route.
#[derive(Clone)]
pub struct AppState {
    /// Appointment assistant for `/api/chat`.
    pub chat: Arc<dyn Assistant>,
    /// Concierge assistant for `/api/xplore`.
    pub xplore: Arc<dyn Assistant>,
    pub orchestrator: Arc<SupportOrchestrator>,
    pub catalog: &'static HealthcareContext,
}

impl AppState {
    pub fn new(
        chat: Arc<dyn Assistant>,
        xplore: Arc<dyn Assistant>,
        orchestrator: Arc<SupportOrchestrator>,
    ) -> Self {
        Self {
            chat,
            xplore,
            orchestrator,
            catalog: &*HEALTHCARE_CONTEXT,
        }
    }

    /// Wires both assistants over one provider and an in-memory orchestrator.
    ///
    /// # Errors
    /// Returns an error if the catalog cannot be rendered into the prompt
    pub fn assemble(
        provider: Arc<dyn AIProvider>,
        pacer: Arc<dyn Pacer>,
        chat_config: &ChatConfig,
    ) -> Result<Self, serde_json::Error> {
        let classifier = Arc::new(chat_config.classifier());
        let chat: Arc<dyn Assistant> = Arc::new(ChatReplyHandler::new(
            provider.clone(),
            classifier.clone(),
            &APPOINTMENT_CONTEXT,
        ));
        let xplore: Arc<dyn Assistant> =
            Arc::new(XploreReplyHandler::new(provider, &HEALTHCARE_CONTEXT)?);

        let orchestrator = SupportOrchestrator::new(
            Arc::new(InMemorySessionStore::new()),
            pacer,
            classifier,
            FlowRuntime::new(chat_config.appointment_profile(), chat.clone()),
            FlowRuntime::new(chat_config.explore_profile(), xplore.clone()),
        );

        Ok(Self::new(chat, xplore, Arc::new(orchestrator)))
    }
}

/// All API routes with their state, without middleware.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .merge(chat_routes())
        .merge(session_routes())
        .merge(catalog_routes())
        .with_state(state)
}

/// API routes wrapped in the middleware stack.
///
/// Outermost first: request id, tracing, id propagation, compression, CORS,
/// timeout.
pub fn api_router(state: AppState, server: &ServerConfig) -> Router {
    api_routes(state)
        .layer(TimeoutLayer::new(Duration::from_secs(server.request_timeout_secs)))
        .layer(cors_layer(server))
        .layer(CompressionLayer::new())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    }
}

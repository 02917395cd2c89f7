//! HTTP routes for the catalog lookups.

use axum::routing::get;
use axum::Router;

use super::super::AppState;
use super::handlers::{compare_packages, list_packages, list_providers, list_slots};

pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        // GET /api/xplore/providers
        .route("/api/xplore/providers", get(list_providers))
        // GET /api/xplore/packages
        .route("/api/xplore/packages", get(list_packages))
        // GET /api/xplore/packages/compare
        .route("/api/xplore/packages/compare", get(compare_packages))
        // GET /api/xplore/slots
        .route("/api/xplore/slots", get(list_slots))
}

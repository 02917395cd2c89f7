//! HTTP handlers for the Xplore catalog lookups.

use axum::extract::{Query, State};
use axum::Json;

use crate::domain::catalog::{PackageComparison, PackageQuery, ProviderQuery};

use super::super::error::ApiError;
use super::super::AppState;
use super::dto::{CompareParams, PackagesResponse, ProvidersResponse, SlotParams, SlotsResponse};

/// GET /api/xplore/providers?location&specialty&service
pub async fn list_providers(
    State(state): State<AppState>,
    Query(query): Query<ProviderQuery>,
) -> Json<ProvidersResponse> {
    let providers: Vec<_> = state
        .catalog
        .find_providers(&query)
        .into_iter()
        .cloned()
        .collect();

    Json(ProvidersResponse {
        count: providers.len(),
        providers,
    })
}

/// GET /api/xplore/packages?pincode&provider
pub async fn list_packages(
    State(state): State<AppState>,
    Query(query): Query<PackageQuery>,
) -> Json<PackagesResponse> {
    let packages: Vec<_> = state
        .catalog
        .find_packages(&query)
        .into_iter()
        .cloned()
        .collect();

    Json(PackagesResponse {
        count: packages.len(),
        packages,
    })
}

/// GET /api/xplore/packages/compare?a&b
///
/// Each side is a package id or an exact package name.
pub async fn compare_packages(
    State(state): State<AppState>,
    Query(params): Query<CompareParams>,
) -> Result<Json<PackageComparison>, ApiError> {
    let (Some(a), Some(b)) = (params.a, params.b) else {
        return Err(ApiError::bad_request(
            "Both 'a' and 'b' package parameters are required",
        ));
    };

    let comparison = state.catalog.compare_packages(&a, &b)?;
    Ok(Json(comparison))
}

/// GET /api/xplore/slots?provider&date
pub async fn list_slots(
    State(state): State<AppState>,
    Query(params): Query<SlotParams>,
) -> Json<SlotsResponse> {
    Json(SlotsResponse {
        slots: state
            .catalog
            .find_slots(params.provider.as_deref(), params.date.as_deref()),
    })
}

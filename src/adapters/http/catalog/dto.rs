//! Catalog lookup bodies.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::{LabPackage, Provider, ProviderSlots};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompareParams {
    pub a: Option<String>,
    pub b: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlotParams {
    pub provider: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvidersResponse {
    pub count: usize,
    pub providers: Vec<Provider>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PackagesResponse {
    pub count: usize,
    pub packages: Vec<LabPackage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotsResponse {
    pub slots: Vec<ProviderSlots>,
}

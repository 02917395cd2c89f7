//! Catalog HTTP adapter: read-only lookups over the Xplore dataset.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::catalog_routes;

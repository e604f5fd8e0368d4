//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//! - **[`extract`]**: Strict request extractors shared by the handlers
//!
//! All endpoints live under `/v1` and are documented with `utoipa`; the rendered reference is
//! served at `/v1/docs`.

pub mod extract;
pub mod handlers;
pub mod models;

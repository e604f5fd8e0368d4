//! API request and response data models.
//!
//! API models are distinct from the database models in [`crate::db::models`]: they decide what
//! crosses the wire (no password hashes, no token digests) and how it is spelled.
//!
//! Request bodies reject unknown keys. Responses are wrapped in a single-key envelope such as
//! `{"movie": {...}}`.

pub mod healthcheck;
pub mod movies;
pub mod pagination;
pub mod tokens;
pub mod users;

use serde::Serialize;
use utoipa::ToSchema;

/// Plain acknowledgement body.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

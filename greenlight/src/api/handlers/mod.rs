//! HTTP request handlers for all API endpoints.
//!
//! Each handler decodes the request, hands it to the matching manager in [`crate::services`],
//! and wraps the result in its response envelope. Errors are converted to responses by
//! [`crate::errors::Error`].

pub mod healthcheck;
pub mod movies;
pub mod tokens;
pub mod users;

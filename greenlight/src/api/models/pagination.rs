//! Pagination types as they appear on the wire.

pub use crate::services::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE, MAX_PAGE_SIZE, PaginationMetadata};

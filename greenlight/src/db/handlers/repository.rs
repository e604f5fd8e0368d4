//! Base repository trait for database operations.

use crate::db::errors::Result;

/// A repository is the data access layer for one Postgres table.
///
/// It wraps a borrowed connection, so callers decide whether the operations run inside a
/// transaction. Entity-specific operations (conditional updates, filtered queries) live on the
/// repository structs themselves.
#[async_trait::async_trait]
pub trait Repository {
    /// The request type for creating entities
    type CreateRequest;

    /// The response/DTO type returned by operations
    type Response;

    /// The identifier type for lookups
    type Id: Send + Sync;

    /// Create a new entity
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response>;

    /// Get an entity by ID
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>>;

    /// Delete an entity by ID
    async fn delete(&mut self, id: Self::Id) -> Result<bool>;
}

//! Business logic between the HTTP handlers and the store.
//!
//! Managers borrow a store for the duration of one request and hold no state of their own. They
//! are generic over the store traits, so they run unchanged against `dyn Store`, the in-memory
//! store, or Postgres.
//!
//! - [`movies::MovieManager`]: validated, version-checked movie mutations and listing
//! - [`accounts::AccountManager`]: registration and activation
//! - [`tokens::TokenManager`]: token issuance, validation and login
//! - [`pagination`]: page bounds and listing metadata

pub mod accounts;
pub mod movies;
pub mod pagination;
pub mod tokens;

pub use accounts::AccountManager;
pub use movies::MovieManager;
pub use tokens::TokenManager;

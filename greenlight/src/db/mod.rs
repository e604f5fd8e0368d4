//! Data persistence and access.
//!
//! ```text
//!          ┌─────────────┐
//!          │  Services   │  (movies, accounts, tokens)
//!          └──────┬──────┘
//!                 │ dyn Store
//!         ┌───────┴────────┐
//!         ↓                ↓
//! ┌───────────────┐ ┌───────────────┐
//! │ InMemoryStore │ │ PostgresStore │
//! └───────────────┘ └───────┬───────┘
//!                           ↓
//!                   ┌───────────────┐
//!                   │ Repositories  │  (db::handlers)
//!                   └───────────────┘
//! ```
//!
//! # Modules
//!
//! - [`store`]: the backend-neutral traits the services are written against
//! - [`in_memory`]: lock-protected maps, the default backend
//! - [`postgres`]: pooled Postgres backend
//! - [`handlers`]: per-table Postgres repositories
//! - [`models`]: record structures matching table schemas
//! - [`errors`]: database-specific error types

pub mod errors;
pub mod handlers;
pub mod in_memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use store::{MovieStore, Store, TokenStore, UserStore};

#[cfg(test)]
mod tests;

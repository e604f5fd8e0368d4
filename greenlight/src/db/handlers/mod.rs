//! Repository implementations for Postgres access.
//!
//! Each repository wraps a `PgConnection` (or a transaction deref'd to one) and returns models
//! from [`crate::db::models`]:
//!
//! ```ignore
//! let mut conn = pool.acquire().await?;
//! let movie = Movies::new(&mut conn).get_by_id(1).await?;
//! ```

pub mod movies;
pub mod repository;
pub mod tokens;
pub mod users;

pub use movies::Movies;
pub use repository::Repository;
pub use tokens::Tokens;
pub use users::Users;

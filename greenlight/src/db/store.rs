//! Storage traits.
//!
//! Managers never talk to a particular backend; they are written against these traits, which are
//! implemented by [`InMemoryStore`](super::in_memory::InMemoryStore) and
//! [`PostgresStore`](super::postgres::PostgresStore).
//!
//! Every mutating method is a single atomic operation from the caller's point of view. In
//! particular the `*_if_version` methods perform the compare-and-swap on `(id, version)`
//! themselves, so two writers holding the same version can never both succeed.

use crate::db::errors::Result;
use crate::db::models::{
    movies::{MovieCreateDBRequest, MovieDBResponse, MovieFilter, MovieUpdateDBRequest},
    tokens::{TokenCreateDBRequest, TokenDBResponse},
    users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
};
use crate::types::{MovieId, TokenScope, UserId};

#[async_trait::async_trait]
pub trait MovieStore: Send + Sync {
    /// Insert a movie with `version = 1`, returning it with its generated id.
    async fn insert_movie(&self, request: &MovieCreateDBRequest) -> Result<MovieDBResponse>;

    async fn get_movie(&self, id: MovieId) -> Result<Option<MovieDBResponse>>;

    /// Replace the movie's fields and bump its version, but only if its current version equals
    /// `expected_version`.
    ///
    /// # Errors
    /// - `DbError::NotFound` if no movie has this id
    /// - `DbError::VersionConflict` if the stored version differs
    async fn update_movie_if_version(
        &self,
        id: MovieId,
        expected_version: i32,
        request: &MovieUpdateDBRequest,
    ) -> Result<MovieDBResponse>;

    /// Returns false if nothing was deleted.
    async fn delete_movie(&self, id: MovieId) -> Result<bool>;

    /// One page of matching movies, plus the number of matches across all pages.
    async fn query_movies(&self, filter: &MovieFilter) -> Result<(Vec<MovieDBResponse>, i64)>;
}

#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// # Errors
    /// - `DbError::UniqueViolation` on constraint `users_email_key` if the email is taken,
    ///   compared case-insensitively
    async fn insert_user(&self, request: &UserCreateDBRequest) -> Result<UserDBResponse>;

    async fn get_user(&self, id: UserId) -> Result<Option<UserDBResponse>>;

    /// Case-insensitive lookup.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserDBResponse>>;

    /// Same contract as [`MovieStore::update_movie_if_version`].
    async fn update_user_if_version(
        &self,
        id: UserId,
        expected_version: i32,
        request: &UserUpdateDBRequest,
    ) -> Result<UserDBResponse>;

    /// Deletes the user and every token it owns.
    async fn delete_user(&self, id: UserId) -> Result<bool>;
}

#[async_trait::async_trait]
pub trait TokenStore: Send + Sync {
    /// # Errors
    /// - `DbError::ForeignKeyViolation` if the owning user does not exist
    async fn insert_token(&self, request: &TokenCreateDBRequest) -> Result<()>;

    /// Look up a token by digest and scope. Expired rows are not filtered here.
    async fn get_token(&self, hash: &[u8], scope: TokenScope) -> Result<Option<TokenDBResponse>>;

    /// Returns the number of tokens removed.
    async fn delete_tokens_for_user(&self, user_id: UserId, scope: TokenScope) -> Result<u64>;
}

/// Everything the application needs from a backend.
pub trait Store: MovieStore + UserStore + TokenStore {}

impl<T: MovieStore + UserStore + TokenStore> Store for T {}

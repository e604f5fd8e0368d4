//! In-memory store implementation.
//!
//! All tables live behind a single `RwLock`, so every trait method is atomic with respect to every
//! other. It's suitable for development and tests; data is lost on restart.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::instrument;

use super::errors::{DbError, Result};
use super::models::{
    movies::{MovieCreateDBRequest, MovieDBResponse, MovieFilter, MovieUpdateDBRequest, SortColumn, SortDirection},
    tokens::{TokenCreateDBRequest, TokenDBResponse},
    users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
};
use super::store::{MovieStore, TokenStore, UserStore};
use crate::types::{MovieId, TokenScope, UserId};

const USERS_EMAIL_KEY: &str = "users_email_key";
const TOKENS_USER_FKEY: &str = "tokens_user_id_fkey";

#[derive(Default)]
struct Tables {
    movies: BTreeMap<MovieId, MovieDBResponse>,
    users: BTreeMap<UserId, UserDBResponse>,
    tokens: BTreeMap<Vec<u8>, TokenDBResponse>,
    next_movie_id: MovieId,
    next_user_id: UserId,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        let email = email.to_lowercase();
        self.users
            .values()
            .any(|u| Some(u.id) != except && u.email.to_lowercase() == email)
    }
}

/// In-memory implementation of the store traits.
///
/// Cloning is cheap and clones share the same tables.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn unique_violation(constraint: &str, table: &str) -> DbError {
    DbError::UniqueViolation {
        constraint: Some(constraint.to_string()),
        table: Some(table.to_string()),
        message: format!("duplicate key value violates unique constraint \"{constraint}\""),
    }
}

fn matches_filter(movie: &MovieDBResponse, filter: &MovieFilter) -> bool {
    let title_ok = filter.title.is_empty() || movie.title.to_lowercase().contains(&filter.title.to_lowercase());
    let genres_ok = filter.genres.iter().all(|g| movie.genres.contains(g));
    title_ok && genres_ok
}

#[async_trait::async_trait]
impl MovieStore for InMemoryStore {
    #[instrument(skip(self, request), fields(title = %request.title), err)]
    async fn insert_movie(&self, request: &MovieCreateDBRequest) -> Result<MovieDBResponse> {
        let mut tables = self.tables.write();
        tables.next_movie_id += 1;
        let movie = MovieDBResponse {
            id: tables.next_movie_id,
            created_at: Utc::now(),
            title: request.title.clone(),
            year: request.year,
            runtime: request.runtime,
            genres: request.genres.clone(),
            version: 1,
        };
        tables.movies.insert(movie.id, movie.clone());
        Ok(movie)
    }

    #[instrument(skip(self), err)]
    async fn get_movie(&self, id: MovieId) -> Result<Option<MovieDBResponse>> {
        Ok(self.tables.read().movies.get(&id).cloned())
    }

    #[instrument(skip(self, request), err)]
    async fn update_movie_if_version(
        &self,
        id: MovieId,
        expected_version: i32,
        request: &MovieUpdateDBRequest,
    ) -> Result<MovieDBResponse> {
        let mut tables = self.tables.write();
        let movie = tables.movies.get_mut(&id).ok_or(DbError::NotFound)?;
        if movie.version != expected_version {
            return Err(DbError::VersionConflict);
        }

        movie.title = request.title.clone();
        movie.year = request.year;
        movie.runtime = request.runtime;
        movie.genres = request.genres.clone();
        movie.version += 1;
        Ok(movie.clone())
    }

    #[instrument(skip(self), err)]
    async fn delete_movie(&self, id: MovieId) -> Result<bool> {
        Ok(self.tables.write().movies.remove(&id).is_some())
    }

    #[instrument(skip(self, filter), fields(page = filter.page, page_size = filter.page_size), err)]
    async fn query_movies(&self, filter: &MovieFilter) -> Result<(Vec<MovieDBResponse>, i64)> {
        let tables = self.tables.read();
        let mut matching: Vec<&MovieDBResponse> = tables.movies.values().filter(|m| matches_filter(m, filter)).collect();

        matching.sort_by(|a, b| {
            let primary = match filter.sort.column {
                SortColumn::Id => a.id.cmp(&b.id),
                SortColumn::Title => a.title.cmp(&b.title),
                SortColumn::Year => a.year.cmp(&b.year),
                SortColumn::Runtime => a.runtime.cmp(&b.runtime),
            };
            let primary = match filter.sort.direction {
                SortDirection::Ascending => primary,
                SortDirection::Descending => primary.reverse(),
            };
            // Ties always break on ascending id
            primary.then(a.id.cmp(&b.id))
        });

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.limit() as usize)
            .cloned()
            .collect();

        Ok((page, total))
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryStore {
    #[instrument(skip(self, request), err)]
    async fn insert_user(&self, request: &UserCreateDBRequest) -> Result<UserDBResponse> {
        let mut tables = self.tables.write();
        if tables.email_taken(&request.email, None) {
            return Err(unique_violation(USERS_EMAIL_KEY, "users"));
        }

        tables.next_user_id += 1;
        let user = UserDBResponse {
            id: tables.next_user_id,
            created_at: Utc::now(),
            name: request.name.clone(),
            email: request.email.clone(),
            password_hash: request.password_hash.clone(),
            activated: false,
            version: 1,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    #[instrument(skip(self), err)]
    async fn get_user(&self, id: UserId) -> Result<Option<UserDBResponse>> {
        Ok(self.tables.read().users.get(&id).cloned())
    }

    #[instrument(skip(self, email), err)]
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserDBResponse>> {
        let email = email.to_lowercase();
        Ok(self
            .tables
            .read()
            .users
            .values()
            .find(|u| u.email.to_lowercase() == email)
            .cloned())
    }

    #[instrument(skip(self, request), err)]
    async fn update_user_if_version(
        &self,
        id: UserId,
        expected_version: i32,
        request: &UserUpdateDBRequest,
    ) -> Result<UserDBResponse> {
        let mut tables = self.tables.write();
        if tables.email_taken(&request.email, Some(id)) {
            return Err(unique_violation(USERS_EMAIL_KEY, "users"));
        }

        let user = tables.users.get_mut(&id).ok_or(DbError::NotFound)?;
        if user.version != expected_version {
            return Err(DbError::VersionConflict);
        }

        user.name = request.name.clone();
        user.email = request.email.clone();
        user.password_hash = request.password_hash.clone();
        user.activated = request.activated;
        user.version += 1;
        Ok(user.clone())
    }

    #[instrument(skip(self), err)]
    async fn delete_user(&self, id: UserId) -> Result<bool> {
        let mut tables = self.tables.write();
        let removed = tables.users.remove(&id).is_some();
        if removed {
            tables.tokens.retain(|_, t| t.user_id != id);
        }
        Ok(removed)
    }
}

#[async_trait::async_trait]
impl TokenStore for InMemoryStore {
    #[instrument(skip(self, request), fields(user_id = request.user_id, scope = %request.scope), err)]
    async fn insert_token(&self, request: &TokenCreateDBRequest) -> Result<()> {
        let mut tables = self.tables.write();
        if !tables.users.contains_key(&request.user_id) {
            return Err(DbError::ForeignKeyViolation {
                constraint: Some(TOKENS_USER_FKEY.to_string()),
                table: Some("tokens".to_string()),
                message: format!("user {} does not exist", request.user_id),
            });
        }
        if tables.tokens.contains_key(&request.hash) {
            return Err(unique_violation("tokens_pkey", "tokens"));
        }

        tables.tokens.insert(
            request.hash.clone(),
            TokenDBResponse {
                hash: request.hash.clone(),
                user_id: request.user_id,
                expiry: request.expiry,
                scope: request.scope,
            },
        );
        Ok(())
    }

    #[instrument(skip(self, hash), err)]
    async fn get_token(&self, hash: &[u8], scope: TokenScope) -> Result<Option<TokenDBResponse>> {
        Ok(self.tables.read().tokens.get(hash).filter(|t| t.scope == scope).cloned())
    }

    #[instrument(skip(self), err)]
    async fn delete_tokens_for_user(&self, user_id: UserId, scope: TokenScope) -> Result<u64> {
        let mut tables = self.tables.write();
        let before = tables.tokens.len();
        tables.tokens.retain(|_, t| !(t.user_id == user_id && t.scope == scope));
        Ok((before - tables.tokens.len()) as u64)
    }
}

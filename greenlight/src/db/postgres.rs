//! Postgres-backed store.
//!
//! Each trait method checks a connection out of the pool and delegates to the matching
//! repository in [`super::handlers`].

use sqlx::PgPool;

use super::errors::{DbError, Result};
use super::handlers::{Movies, Repository, Tokens, Users};
use super::models::{
    movies::{MovieCreateDBRequest, MovieDBResponse, MovieFilter, MovieUpdateDBRequest},
    tokens::{TokenCreateDBRequest, TokenDBResponse},
    users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
};
use super::store::{MovieStore, TokenStore, UserStore};
use crate::types::{MovieId, TokenScope, UserId};

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn conn(&self) -> Result<sqlx::pool::PoolConnection<sqlx::Postgres>> {
        self.pool.acquire().await.map_err(DbError::from)
    }
}

#[async_trait::async_trait]
impl MovieStore for PostgresStore {
    async fn insert_movie(&self, request: &MovieCreateDBRequest) -> Result<MovieDBResponse> {
        let mut conn = self.conn().await?;
        Movies::new(&mut conn).create(request).await
    }

    async fn get_movie(&self, id: MovieId) -> Result<Option<MovieDBResponse>> {
        let mut conn = self.conn().await?;
        Movies::new(&mut conn).get_by_id(id).await
    }

    async fn update_movie_if_version(
        &self,
        id: MovieId,
        expected_version: i32,
        request: &MovieUpdateDBRequest,
    ) -> Result<MovieDBResponse> {
        let mut conn = self.conn().await?;
        Movies::new(&mut conn).update_if_version(id, expected_version, request).await
    }

    async fn delete_movie(&self, id: MovieId) -> Result<bool> {
        let mut conn = self.conn().await?;
        Movies::new(&mut conn).delete(id).await
    }

    async fn query_movies(&self, filter: &MovieFilter) -> Result<(Vec<MovieDBResponse>, i64)> {
        // Count and page must see the same snapshot
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;
        let result = Movies::new(&mut tx).query(filter).await?;
        tx.commit().await?;
        Ok(result)
    }
}

#[async_trait::async_trait]
impl UserStore for PostgresStore {
    async fn insert_user(&self, request: &UserCreateDBRequest) -> Result<UserDBResponse> {
        let mut conn = self.conn().await?;
        Users::new(&mut conn).create(request).await
    }

    async fn get_user(&self, id: UserId) -> Result<Option<UserDBResponse>> {
        let mut conn = self.conn().await?;
        Users::new(&mut conn).get_by_id(id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserDBResponse>> {
        let mut conn = self.conn().await?;
        Users::new(&mut conn).get_user_by_email(email).await
    }

    async fn update_user_if_version(
        &self,
        id: UserId,
        expected_version: i32,
        request: &UserUpdateDBRequest,
    ) -> Result<UserDBResponse> {
        let mut conn = self.conn().await?;
        Users::new(&mut conn).update_if_version(id, expected_version, request).await
    }

    async fn delete_user(&self, id: UserId) -> Result<bool> {
        let mut conn = self.conn().await?;
        Users::new(&mut conn).delete(id).await
    }
}

#[async_trait::async_trait]
impl TokenStore for PostgresStore {
    async fn insert_token(&self, request: &TokenCreateDBRequest) -> Result<()> {
        let mut conn = self.conn().await?;
        Tokens::new(&mut conn).create(request).await
    }

    async fn get_token(&self, hash: &[u8], scope: TokenScope) -> Result<Option<TokenDBResponse>> {
        let mut conn = self.conn().await?;
        Tokens::new(&mut conn).get_by_hash(hash, scope).await
    }

    async fn delete_tokens_for_user(&self, user_id: UserId, scope: TokenScope) -> Result<u64> {
        let mut conn = self.conn().await?;
        Tokens::new(&mut conn).delete_all_for_user(user_id, scope).await
    }
}

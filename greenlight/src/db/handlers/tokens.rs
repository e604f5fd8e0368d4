//! Database repository for activation and authentication tokens.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

use crate::{
    db::{
        errors::{DbError, Result},
        models::tokens::{TokenCreateDBRequest, TokenDBResponse},
    },
    types::{TokenScope, UserId},
};

/// Raw row; `scope` is stored as text.
#[derive(FromRow)]
struct TokenRow {
    hash: Vec<u8>,
    user_id: UserId,
    expiry: DateTime<Utc>,
    scope: String,
}

impl TryFrom<TokenRow> for TokenDBResponse {
    type Error = DbError;

    fn try_from(row: TokenRow) -> Result<Self> {
        Ok(TokenDBResponse {
            hash: row.hash,
            user_id: row.user_id,
            expiry: row.expiry,
            scope: row.scope.parse().map_err(DbError::Other)?,
        })
    }
}

pub struct Tokens<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Tokens<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(user_id = request.user_id, scope = %request.scope), err)]
    pub async fn create(&mut self, request: &TokenCreateDBRequest) -> Result<()> {
        sqlx::query("INSERT INTO tokens (hash, user_id, expiry, scope) VALUES ($1, $2, $3, $4)")
            .bind(&request.hash)
            .bind(request.user_id)
            .bind(request.expiry)
            .bind(request.scope.as_str())
            .execute(&mut *self.db)
            .await?;

        Ok(())
    }

    #[instrument(skip(self, hash), err)]
    pub async fn get_by_hash(&mut self, hash: &[u8], scope: TokenScope) -> Result<Option<TokenDBResponse>> {
        let row = sqlx::query_as::<_, TokenRow>(
            "SELECT hash, user_id, expiry, scope FROM tokens WHERE hash = $1 AND scope = $2",
        )
        .bind(hash)
        .bind(scope.as_str())
        .fetch_optional(&mut *self.db)
        .await?;

        row.map(TokenDBResponse::try_from).transpose()
    }

    #[instrument(skip(self), err)]
    pub async fn delete_all_for_user(&mut self, user_id: UserId, scope: TokenScope) -> Result<u64> {
        let result = sqlx::query("DELETE FROM tokens WHERE user_id = $1 AND scope = $2")
            .bind(user_id)
            .bind(scope.as_str())
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected())
    }
}

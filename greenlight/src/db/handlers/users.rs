//! Database repository for users.

use sqlx::PgConnection;
use tracing::instrument;

use crate::{
    db::{
        errors::{DbError, Result},
        handlers::repository::Repository,
        models::users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
    },
    types::UserId,
};

const USER_COLUMNS: &str = "id, created_at, name, email, password_hash, activated, version";

pub struct Users<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type CreateRequest = UserCreateDBRequest;
    type Response = UserDBResponse;
    type Id = UserId;

    #[instrument(skip(self, request), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let user = sqlx::query_as::<_, UserDBResponse>(&format!(
            "INSERT INTO users (name, email, password_hash, activated) VALUES ($1, $2, $3, false) RETURNING {USER_COLUMNS}"
        ))
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.password_hash)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let user = sqlx::query_as::<_, UserDBResponse>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    /// Tokens go with the user through `ON DELETE CASCADE`.
    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, email), err)]
    pub async fn get_user_by_email(&mut self, email: &str) -> Result<Option<UserDBResponse>> {
        let user =
            sqlx::query_as::<_, UserDBResponse>(&format!("SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)"))
                .bind(email)
                .fetch_optional(&mut *self.db)
                .await?;

        Ok(user)
    }

    /// Compare-and-swap on `(id, version)`.
    #[instrument(skip(self, request), err)]
    pub async fn update_if_version(
        &mut self,
        id: UserId,
        expected_version: i32,
        request: &UserUpdateDBRequest,
    ) -> Result<UserDBResponse> {
        let updated = sqlx::query_as::<_, UserDBResponse>(&format!(
            r#"
            UPDATE users
            SET name = $1, email = $2, password_hash = $3, activated = $4, version = version + 1
            WHERE id = $5 AND version = $6
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.password_hash)
        .bind(request.activated)
        .bind(id)
        .bind(expected_version)
        .fetch_optional(&mut *self.db)
        .await?;

        match updated {
            Some(user) => Ok(user),
            None => {
                let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
                    .bind(id)
                    .fetch_one(&mut *self.db)
                    .await?;
                Err(if exists { DbError::VersionConflict } else { DbError::NotFound })
            }
        }
    }
}

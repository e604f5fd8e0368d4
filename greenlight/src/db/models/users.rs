//! Database models for users.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::types::UserId;

/// Database request for creating a new user
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Database request for replacing a user's mutable fields
#[derive(Debug, Clone)]
pub struct UserUpdateDBRequest {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub activated: bool,
}

impl From<&UserDBResponse> for UserUpdateDBRequest {
    fn from(user: &UserDBResponse) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            activated: user.activated,
        }
    }
}

/// Database response for a user
#[derive(Clone, PartialEq, FromRow)]
pub struct UserDBResponse {
    pub id: UserId,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub activated: bool,
    pub version: i32,
}

// Keep password hashes out of logs
impl std::fmt::Debug for UserDBResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserDBResponse")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("activated", &self.activated)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

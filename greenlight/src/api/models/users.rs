//! API request/response models for user accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::tokens::TokenResponse;
use crate::db::models::users::UserDBResponse;
use crate::services::accounts::NewAccount;
use crate::types::UserId;

/// Request body for registering an account.
#[derive(Clone, Default, Deserialize, ToSchema)]
#[serde(default, deny_unknown_fields)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl From<RegisterRequest> for NewAccount {
    fn from(request: RegisterRequest) -> Self {
        Self {
            name: request.name,
            email: request.email,
            password: request.password,
        }
    }
}

/// Request body for activating an account.
#[derive(Clone, Default, Deserialize, ToSchema)]
#[serde(default, deny_unknown_fields)]
pub struct ActivateRequest {
    /// Activation token plaintext
    pub token: String,
}

/// Public view of an account. Password hash and version stay server-side.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: UserId,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub email: String,
    pub activated: bool,
}

impl From<UserDBResponse> for UserResponse {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            created_at: db.created_at,
            name: db.name,
            email: db.email,
            activated: db.activated,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserEnvelope {
    pub user: UserResponse,
    /// Only present when the server is configured to echo activation tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activation_token: Option<TokenResponse>,
}

//! API request/response models for tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::tokens::TokenPlaintext;
use crate::services::tokens::IssuedToken;

/// Request body for logging in.
#[derive(Clone, Default, Deserialize, ToSchema)]
#[serde(default, deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenResponse {
    #[schema(value_type = String, example = "AwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8gISI")]
    pub token: TokenPlaintext,
    pub expiry: DateTime<Utc>,
}

impl From<IssuedToken> for TokenResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.plaintext,
            expiry: issued.expiry,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthenticationTokenEnvelope {
    pub authentication_token: TokenResponse,
}

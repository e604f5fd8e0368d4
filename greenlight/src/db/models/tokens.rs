//! Database models for activation and authentication tokens.

use chrono::{DateTime, Utc};

use crate::types::{TokenScope, UserId};

/// Database request for storing a token. Only the SHA-256 digest of the plaintext is kept.
#[derive(Debug, Clone)]
pub struct TokenCreateDBRequest {
    pub hash: Vec<u8>,
    pub user_id: UserId,
    pub expiry: DateTime<Utc>,
    pub scope: TokenScope,
}

/// Database response for a token
#[derive(Debug, Clone, PartialEq)]
pub struct TokenDBResponse {
    pub hash: Vec<u8>,
    pub user_id: UserId,
    pub expiry: DateTime<Utc>,
    pub scope: TokenScope,
}

impl TokenDBResponse {
    /// A token whose expiry is at or before `now` is treated as absent.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry > now
    }
}

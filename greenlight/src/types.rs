//! Common type definitions.
//!
//! # ID Types
//!
//! Movies and users are keyed by positive, store-generated 64-bit integers:
//!
//! - [`MovieId`]: Movie record identifier
//! - [`UserId`]: User account identifier
//!
//! # Token Scopes
//!
//! [`TokenScope`] names what a token may be used for. A token is only ever valid for the scope
//! it was issued under.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

// Type aliases for IDs
pub type MovieId = i64;
pub type UserId = i64;

/// The purpose a token was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TokenScope {
    /// Single-use token proving control of a registered email address
    Activation,
    /// Bearer credential issued at login
    Authentication,
}

impl TokenScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenScope::Activation => "activation",
            TokenScope::Authentication => "authentication",
        }
    }
}

impl fmt::Display for TokenScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenScope {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "activation" => Ok(TokenScope::Activation),
            "authentication" => Ok(TokenScope::Authentication),
            other => Err(anyhow::anyhow!("unknown token scope: {other}")),
        }
    }
}

//! Token lifecycle: issue, validate, purge, and email/password login.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{
    auth::{
        password,
        tokens::{TokenPlaintext, hash_token, is_well_formed},
    },
    config::PasswordConfig,
    db::{
        models::tokens::TokenCreateDBRequest,
        store::{TokenStore, UserStore},
    },
    errors::{Error, Result},
    types::{TokenScope, UserId},
    validator::{EMAIL_RX, Validator, matches},
};

/// A freshly issued token. The plaintext exists only here and is wiped when this is dropped.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub plaintext: TokenPlaintext,
    pub user_id: UserId,
    pub expiry: DateTime<Utc>,
    pub scope: TokenScope,
}

pub fn validate_email(v: &mut Validator, email: &str) {
    v.check(!email.is_empty(), "email", "must be provided");
    v.check(matches(email, &EMAIL_RX), "email", "must be a valid email address");
}

pub fn validate_password_plaintext(v: &mut Validator, password: &str, rules: &PasswordConfig) {
    v.check(!password.is_empty(), "password", "must be provided");
    v.check(
        password.len() >= rules.min_length,
        "password",
        format!("must be at least {} bytes long", rules.min_length),
    );
    v.check(
        password.len() <= rules.max_length,
        "password",
        format!("must not be more than {} bytes long", rules.max_length),
    );
}

pub struct TokenManager<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: TokenStore + UserStore + ?Sized> TokenManager<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Generate a token for `user_id`, store its digest, and hand back the plaintext.
    #[instrument(skip(self), err)]
    pub async fn issue(&self, user_id: UserId, scope: TokenScope, ttl: Duration) -> Result<IssuedToken> {
        let ttl = chrono::Duration::from_std(ttl).map_err(|e| Error::Internal {
            operation: format!("convert token ttl: {e}"),
        })?;
        let plaintext = TokenPlaintext::generate();
        let expiry = Utc::now() + ttl;

        self.store
            .insert_token(&TokenCreateDBRequest {
                hash: plaintext.hash().to_vec(),
                user_id,
                expiry,
                scope,
            })
            .await?;

        Ok(IssuedToken {
            plaintext,
            user_id,
            expiry,
            scope,
        })
    }

    /// Resolve a plaintext to the user it was issued to.
    ///
    /// Malformed, unknown, expired, and wrong-scope tokens all yield [`Error::InvalidToken`].
    #[instrument(skip(self, plaintext), err)]
    pub async fn validate(&self, plaintext: &str, scope: TokenScope) -> Result<UserId> {
        if !is_well_formed(plaintext) {
            debug!("Rejecting malformed {} token", scope);
            return Err(Error::InvalidToken);
        }

        let token = self.store.get_token(&hash_token(plaintext), scope).await?;
        match token {
            Some(token) if token.is_live_at(Utc::now()) => Ok(token.user_id),
            Some(_) => {
                debug!("Rejecting expired {} token", scope);
                Err(Error::InvalidToken)
            }
            None => Err(Error::InvalidToken),
        }
    }

    #[instrument(skip(self), err)]
    pub async fn purge_for_user(&self, user_id: UserId, scope: TokenScope) -> Result<u64> {
        Ok(self.store.delete_tokens_for_user(user_id, scope).await?)
    }

    /// Check an email/password pair and issue an authentication token.
    ///
    /// An unknown email and a wrong password produce the same [`Error::InvalidCredentials`], and
    /// both pay for one Argon2 computation.
    #[instrument(skip_all, err)]
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
        rules: &PasswordConfig,
        ttl: Duration,
    ) -> Result<IssuedToken> {
        let mut v = Validator::new();
        validate_email(&mut v, email);
        validate_password_plaintext(&mut v, password, rules);
        v.finish()?;

        let Some(user) = self.store.get_user_by_email(email).await? else {
            password::verify_password_without_hash(password.to_string(), rules.argon2_params()).await?;
            return Err(Error::InvalidCredentials);
        };

        let matched = password::verify_password(password.to_string(), user.password_hash.clone()).await?;
        if !matched {
            return Err(Error::InvalidCredentials);
        }

        self.issue(user.id, TokenScope::Authentication, ttl).await
    }
}

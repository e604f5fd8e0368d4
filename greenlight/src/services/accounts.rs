//! User registration and activation.

use tracing::{info, instrument};

use crate::{
    auth::password,
    config::AuthConfig,
    db::{
        errors::DbError,
        models::users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
        store::{TokenStore, UserStore},
    },
    errors::{Error, Result},
    services::tokens::{IssuedToken, TokenManager, validate_email, validate_password_plaintext},
    types::TokenScope,
    validator::Validator,
};

pub const DUPLICATE_EMAIL: &str = "a user with this email address already exists";
pub const INVALID_ACTIVATION_TOKEN: &str = "invalid or expired activation token";

/// Input for [`AccountManager::register`]. `Debug` leaves out the password.
#[derive(Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Result of a successful registration.
#[derive(Debug)]
pub struct Registration {
    pub user: UserDBResponse,
    pub activation_token: IssuedToken,
}

pub struct AccountManager<'a, S: ?Sized> {
    store: &'a S,
    config: &'a AuthConfig,
}

impl<'a, S: UserStore + TokenStore + ?Sized> AccountManager<'a, S> {
    pub fn new(store: &'a S, config: &'a AuthConfig) -> Self {
        Self { store, config }
    }

    /// Create an inactive account and issue its activation token.
    #[instrument(skip_all, fields(email = %account.email), err)]
    pub async fn register(&self, account: NewAccount) -> Result<Registration> {
        let mut v = Validator::new();
        v.check(!account.name.is_empty(), "name", "must be provided");
        v.check(account.name.len() <= 500, "name", "must not be more than 500 bytes long");
        validate_email(&mut v, &account.email);
        validate_password_plaintext(&mut v, &account.password, &self.config.password);
        v.finish()?;

        let password_hash = password::hash_password(account.password, self.config.password.argon2_params()).await?;

        let user = self
            .store
            .insert_user(&UserCreateDBRequest {
                name: account.name,
                email: account.email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                e if e.is_duplicate_email() => Error::invalid_field("email", DUPLICATE_EMAIL),
                e => Error::Database(e),
            })?;

        let activation_token = TokenManager::new(self.store)
            .issue(user.id, TokenScope::Activation, self.config.activation_token_ttl)
            .await?;

        info!(user_id = user.id, "Registered user");
        Ok(Registration { user, activation_token })
    }

    /// Activate the account an activation token was issued to, consuming every activation token
    /// the account holds.
    #[instrument(skip_all, err)]
    pub async fn activate(&self, plaintext: &str) -> Result<UserDBResponse> {
        if plaintext.is_empty() {
            return Err(Error::invalid_field("token", "must be provided"));
        }

        let tokens = TokenManager::new(self.store);
        let user_id = match tokens.validate(plaintext, TokenScope::Activation).await {
            Ok(user_id) => user_id,
            Err(Error::InvalidToken) => return Err(Error::invalid_field("token", INVALID_ACTIVATION_TOKEN)),
            Err(e) => return Err(e),
        };

        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or_else(|| Error::invalid_field("token", INVALID_ACTIVATION_TOKEN))?;

        let mut update = UserUpdateDBRequest::from(&user);
        update.activated = true;

        let user = self
            .store
            .update_user_if_version(user.id, user.version, &update)
            .await
            .map_err(|e| match e {
                DbError::VersionConflict => Error::EditConflict,
                DbError::NotFound => Error::invalid_field("token", INVALID_ACTIVATION_TOKEN),
                e => Error::Database(e),
            })?;

        tokens.purge_for_user(user.id, TokenScope::Activation).await?;

        info!(user_id = user.id, "Activated user");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryStore;
    use crate::test_utils::create_test_config;

    fn alice() -> NewAccount {
        NewAccount {
            name: "Alice Smith".to_string(),
            email: "alice@example.com".to_string(),
            password: "pa55word".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_creates_inactive_user() {
        let config = create_test_config();
        let store = InMemoryStore::new();
        let accounts = AccountManager::new(&store, &config.auth);

        let registration = accounts.register(alice()).await.unwrap();
        assert!(!registration.user.activated);
        assert_eq!(registration.user.version, 1);
        assert_ne!(registration.user.password_hash, "pa55word");
        assert_eq!(registration.activation_token.scope, TokenScope::Activation);
        assert_eq!(registration.activation_token.user_id, registration.user.id);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let config = create_test_config();
        let store = InMemoryStore::new();
        let accounts = AccountManager::new(&store, &config.auth);
        accounts.register(alice()).await.unwrap();

        let mut again = alice();
        again.email = "ALICE@example.com".to_string();
        match accounts.register(again).await {
            Err(Error::Validation { errors }) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors["email"], DUPLICATE_EMAIL);
            }
            other => panic!("expected duplicate email error, got {other:?}"),
        }
        assert!(store.get_user(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_register_reports_every_invalid_field() {
        let config = create_test_config();
        let store = InMemoryStore::new();
        let accounts = AccountManager::new(&store, &config.auth);

        let err = accounts
            .register(NewAccount {
                name: String::new(),
                email: "not-an-email".to_string(),
                password: "x".repeat(73),
            })
            .await
            .unwrap_err();
        match err {
            Error::Validation { errors } => {
                assert_eq!(errors["name"], "must be provided");
                assert_eq!(errors["email"], "must be a valid email address");
                assert_eq!(errors["password"], "must not be more than 72 bytes long");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_activate_is_single_use() {
        let config = create_test_config();
        let store = InMemoryStore::new();
        let accounts = AccountManager::new(&store, &config.auth);
        let registration = accounts.register(alice()).await.unwrap();
        let plaintext = registration.activation_token.plaintext.as_str().to_string();

        let user = accounts.activate(&plaintext).await.unwrap();
        assert!(user.activated);
        assert_eq!(user.version, 2);

        match accounts.activate(&plaintext).await {
            Err(Error::Validation { errors }) => assert_eq!(errors["token"], INVALID_ACTIVATION_TOKEN),
            other => panic!("expected replay to fail, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_activate_rejects_bad_tokens_uniformly() {
        let config = create_test_config();
        let store = InMemoryStore::new();
        let accounts = AccountManager::new(&store, &config.auth);

        match accounts.activate("").await {
            Err(Error::Validation { errors }) => assert_eq!(errors["token"], "must be provided"),
            other => panic!("expected validation error, got {other:?}"),
        }

        let unknown = crate::auth::tokens::TokenPlaintext::generate();
        for plaintext in ["aaaaaaaaaaaaaaaaaaaaaaaaaa", unknown.as_str()] {
            match accounts.activate(plaintext).await {
                Err(Error::Validation { errors }) => assert_eq!(errors["token"], INVALID_ACTIVATION_TOKEN),
                other => panic!("expected validation error, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_activate_with_expired_token() {
        let mut config = create_test_config();
        config.auth.activation_token_ttl = std::time::Duration::ZERO;
        let store = InMemoryStore::new();
        let accounts = AccountManager::new(&store, &config.auth);
        let registration = accounts.register(alice()).await.unwrap();

        match accounts.activate(registration.activation_token.plaintext.as_str()).await {
            Err(Error::Validation { errors }) => assert_eq!(errors["token"], INVALID_ACTIVATION_TOKEN),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(!store.get_user(registration.user.id).await.unwrap().unwrap().activated);
    }
}
